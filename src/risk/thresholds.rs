use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Threshold configuration for the risk rules.
///
/// Immutable once handed to the engine; there is no process-wide mutable
/// configuration. Percentage fields are expressed in percent units
/// (10 means 10%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Margin below this percentage flags a period.
    pub low_profit_margin: Decimal,
    /// Cost/revenue ratio above this percentage flags a period.
    pub high_cost_ratio: Decimal,
    /// Consecutive negative-profit periods needed to flag a streak.
    pub negative_profit_streak: usize,
    /// Revenue this far below the ledger-wide mean flags a period.
    pub revenue_drop_pct: Decimal,
    /// Cost this far above the ledger-wide mean flags a period.
    pub cost_spike_pct: Decimal,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_profit_margin: dec!(10),
            high_cost_ratio: dec!(80),
            negative_profit_streak: 3,
            revenue_drop_pct: dec!(20),
            cost_spike_pct: dec!(30),
        }
    }
}

impl RiskThresholds {
    /// Merge named overrides onto the defaults.
    ///
    /// Missing keys keep their defaults; unknown keys are ignored (logged
    /// at debug level), matching merge-not-replace semantics.
    pub fn with_overrides(overrides: &HashMap<String, Decimal>) -> Self {
        let mut thresholds = Self::default();
        for (key, value) in overrides {
            match key.as_str() {
                "low_profit_margin" => thresholds.low_profit_margin = *value,
                "high_cost_ratio" => thresholds.high_cost_ratio = *value,
                "negative_profit_streak" => {
                    // to_usize truncates, so round-trip to catch fractions
                    match value
                        .to_usize()
                        .filter(|&periods| Decimal::from(periods as u64) == *value)
                    {
                        Some(periods) => thresholds.negative_profit_streak = periods,
                        None => log::debug!(
                            "ignoring non-integral negative_profit_streak override {value}"
                        ),
                    }
                }
                "revenue_drop_pct" => thresholds.revenue_drop_pct = *value,
                "cost_spike_pct" => thresholds.cost_spike_pct = *value,
                unknown => log::debug!("ignoring unknown risk threshold key '{unknown}'"),
            }
        }
        thresholds
    }
}
