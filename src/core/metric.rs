use serde::{Deserialize, Serialize};
use std::fmt;

/// The three base metrics tracked for every record.
///
/// Used wherever an operation is parameterized by metric: trend analysis,
/// top-period ranking, scenario comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Revenue,
    Cost,
    Profit,
}

impl Metric {
    /// All metrics in canonical order (revenue, cost, profit).
    pub const ALL: [Metric; 3] = [Metric::Revenue, Metric::Cost, Metric::Profit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::Cost => "cost",
            Metric::Profit => "profit",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revenue" => Ok(Metric::Revenue),
            "cost" => Ok(Metric::Cost),
            "profit" => Ok(Metric::Profit),
            other => Err(format!(
                "unknown metric '{other}', expected revenue, cost, or profit"
            )),
        }
    }
}
