use crate::core::error::AnalysisError;
use crate::core::ledger::Ledger;
use crate::core::record::margin_of;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The perturbation a scenario applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioKind {
    RevenueChange { pct: Decimal },
    CostChange { pct: Decimal },
    CombinedChange { revenue_pct: Decimal, cost_pct: Decimal },
}

/// Ledger-wide totals with margin derived from the sums.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub margin: Decimal,
}

impl Totals {
    pub fn of(ledger: &Ledger) -> Self {
        let revenue = ledger.total_revenue();
        let cost = ledger.total_cost();
        let profit = ledger.total_profit();
        Self {
            revenue,
            cost,
            profit,
            margin: margin_of(profit, revenue),
        }
    }
}

/// Absolute and percentage change of one total between baseline and
/// simulation. A zero baseline makes the percentage undefined (`None`),
/// never an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub absolute: Decimal,
    pub percent: Option<f64>,
}

impl Delta {
    fn between(baseline: Decimal, simulated: Decimal) -> Self {
        let absolute = simulated - baseline;
        let percent = if baseline == Decimal::ZERO {
            None
        } else {
            let pct = absolute / baseline * dec!(100);
            Some(pct.to_string().parse::<f64>().unwrap_or(0.0))
        };
        Self { absolute, percent }
    }
}

/// Impact of a scenario on each total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioImpact {
    pub revenue: Delta,
    pub cost: Delta,
    pub profit: Delta,
    pub margin: Delta,
}

/// One computed what-if scenario. Immutable once built; the baseline ledger
/// is never touched (copy-on-write).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub kind: ScenarioKind,
    pub baseline: Totals,
    pub simulated: Totals,
    pub impact: ScenarioImpact,
    /// The perturbed ledger, for presenters that want per-period detail.
    pub ledger: Ledger,
}

/// Metric used to rank scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioMetric {
    Profit,
    Revenue,
    Margin,
}

impl ScenarioMetric {
    fn of(&self, totals: &Totals) -> Decimal {
        match self {
            ScenarioMetric::Profit => totals.profit,
            ScenarioMetric::Revenue => totals.revenue,
            ScenarioMetric::Margin => totals.margin,
        }
    }
}

/// One row of a scenario comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub name: String,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub margin: Decimal,
}

/// Comparison of every scenario computed so far, baseline first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub rows: Vec<ComparisonRow>,
}

impl fmt::Display for ScenarioComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Scenario Comparison ===")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<28} revenue {:>14} cost {:>14} profit {:>14} margin {:>7.2}%",
                row.name,
                row.revenue.round_dp(2),
                row.cost.round_dp(2),
                row.profit.round_dp(2),
                row.margin.round_dp(2),
            )?;
        }
        Ok(())
    }
}

/// The scenario engine.
///
/// Owns an immutable baseline snapshot and collects scenarios in creation
/// order for comparison. Each simulation works on a fresh copy of the
/// baseline.
#[derive(Debug, Clone)]
pub struct ScenarioEngine {
    baseline: Ledger,
    scenarios: Vec<Scenario>,
}

impl ScenarioEngine {
    pub fn new(baseline: Ledger) -> Self {
        Self {
            baseline,
            scenarios: Vec::new(),
        }
    }

    pub fn baseline(&self) -> &Ledger {
        &self.baseline
    }

    /// Scenarios computed so far, in creation order.
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Scale every record's revenue by `(1 + pct/100)`; cost unchanged.
    pub fn simulate_revenue_change(&mut self, pct: Decimal) -> Scenario {
        let name = format!("Revenue {}%", signed(pct));
        self.simulate_named(ScenarioKind::RevenueChange { pct }, name)
    }

    /// Scale every record's cost by `(1 + pct/100)`; revenue unchanged.
    pub fn simulate_cost_change(&mut self, pct: Decimal) -> Scenario {
        let name = format!("Cost {}%", signed(pct));
        self.simulate_named(ScenarioKind::CostChange { pct }, name)
    }

    /// Apply independent revenue and cost scalings to the same copy.
    pub fn simulate_combined_change(
        &mut self,
        revenue_pct: Decimal,
        cost_pct: Decimal,
    ) -> Scenario {
        let name = format!(
            "Revenue {}%, Cost {}%",
            signed(revenue_pct),
            signed(cost_pct)
        );
        self.simulate_named(
            ScenarioKind::CombinedChange {
                revenue_pct,
                cost_pct,
            },
            name,
        )
    }

    /// Run a scenario under an explicit name.
    pub fn simulate_named(&mut self, kind: ScenarioKind, name: impl Into<String>) -> Scenario {
        let name = name.into();
        let (revenue_pct, cost_pct) = match kind {
            ScenarioKind::RevenueChange { pct } => (Some(pct), None),
            ScenarioKind::CostChange { pct } => (None, Some(pct)),
            ScenarioKind::CombinedChange {
                revenue_pct,
                cost_pct,
            } => (Some(revenue_pct), Some(cost_pct)),
        };

        for (field, pct) in [("revenue", revenue_pct), ("cost", cost_pct)] {
            if let Some(pct) = pct {
                if pct <= dec!(-100) {
                    log::warn!(
                        "scenario '{name}': {field} change of {pct}% zeroes or inverts every \
                         record; computing anyway"
                    );
                }
            }
        }

        let simulated_ledger = perturb(&self.baseline, revenue_pct, cost_pct);
        let baseline = Totals::of(&self.baseline);
        let simulated = Totals::of(&simulated_ledger);

        let scenario = Scenario {
            name,
            kind,
            baseline,
            simulated,
            impact: ScenarioImpact {
                revenue: Delta::between(baseline.revenue, simulated.revenue),
                cost: Delta::between(baseline.cost, simulated.cost),
                profit: Delta::between(baseline.profit, simulated.profit),
                margin: Delta::between(baseline.margin, simulated.margin),
            },
            ledger: simulated_ledger,
        };
        self.scenarios.push(scenario.clone());
        scenario
    }

    /// Tabulate all scenarios in creation order, baseline row first.
    pub fn compare_scenarios(&self) -> Result<ScenarioComparison, AnalysisError> {
        if self.scenarios.is_empty() {
            return Err(AnalysisError::NoScenarios);
        }

        let baseline = Totals::of(&self.baseline);
        let mut rows = vec![ComparisonRow {
            name: "Baseline".to_string(),
            revenue: baseline.revenue,
            cost: baseline.cost,
            profit: baseline.profit,
            margin: baseline.margin,
        }];
        rows.extend(self.scenarios.iter().map(|s| ComparisonRow {
            name: s.name.clone(),
            revenue: s.simulated.revenue,
            cost: s.simulated.cost,
            profit: s.simulated.profit,
            margin: s.simulated.margin,
        }));
        Ok(ScenarioComparison { rows })
    }

    /// The scenario with the maximum simulated value of the chosen metric;
    /// the earliest-created scenario wins ties.
    pub fn best_scenario(&self, metric: ScenarioMetric) -> Result<&Scenario, AnalysisError> {
        let mut best: Option<&Scenario> = None;
        for scenario in &self.scenarios {
            let better = match best {
                // Strict comparison keeps the earliest on ties
                Some(current) => {
                    metric.of(&scenario.simulated) > metric.of(&current.simulated)
                }
                None => true,
            };
            if better {
                best = Some(scenario);
            }
        }
        best.ok_or(AnalysisError::NoScenarios)
    }
}

/// Copy-on-write perturbation of a ledger.
fn perturb(baseline: &Ledger, revenue_pct: Option<Decimal>, cost_pct: Option<Decimal>) -> Ledger {
    let revenue_factor = revenue_pct.map(|pct| (dec!(100) + pct) / dec!(100));
    let cost_factor = cost_pct.map(|pct| (dec!(100) + pct) / dec!(100));

    baseline
        .records()
        .iter()
        .map(|record| {
            let mut record = record.clone();
            if let Some(factor) = revenue_factor {
                record = record.with_revenue(record.revenue() * factor);
            }
            if let Some(factor) = cost_factor {
                record = record.with_cost(record.cost() * factor);
            }
            record
        })
        .collect()
}

fn signed(pct: Decimal) -> String {
    if pct >= Decimal::ZERO {
        format!("+{pct}")
    } else {
        pct.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn baseline() -> Ledger {
        // Total revenue 45300, cost 27000, profit 18300
        Ledger::from_observations([
            (date(2024, 1, 1), dec!(15000), dec!(9000)),
            (date(2024, 1, 2), dec!(14800), dec!(8500)),
            (date(2024, 1, 3), dec!(15500), dec!(9500)),
        ])
    }

    #[test]
    fn test_revenue_plus_ten_percent() {
        let mut engine = ScenarioEngine::new(baseline());
        let scenario = engine.simulate_revenue_change(dec!(10));
        assert_eq!(scenario.name, "Revenue +10%");
        assert_eq!(scenario.baseline.revenue, dec!(45300));
        assert_eq!(scenario.simulated.revenue, dec!(49830));
        assert_eq!(scenario.impact.revenue.absolute, dec!(4530));
        assert_eq!(scenario.impact.revenue.percent, Some(10.0));
        // Cost untouched
        assert_eq!(scenario.simulated.cost, scenario.baseline.cost);
        // Extra revenue flows straight into profit
        assert_eq!(scenario.impact.profit.absolute, dec!(4530));
    }

    #[test]
    fn test_zero_change_is_identity() {
        let mut engine = ScenarioEngine::new(baseline());
        let scenario = engine.simulate_revenue_change(Decimal::ZERO);
        assert_eq!(scenario.simulated, scenario.baseline);
        assert_eq!(scenario.impact.profit.absolute, Decimal::ZERO);
        assert_eq!(scenario.ledger, *engine.baseline());
    }

    #[test]
    fn test_cost_reduction() {
        let mut engine = ScenarioEngine::new(baseline());
        let scenario = engine.simulate_cost_change(dec!(-10));
        assert_eq!(scenario.name, "Cost -10%");
        assert_eq!(scenario.simulated.cost, dec!(24300));
        assert_eq!(scenario.impact.cost.absolute, dec!(-2700));
        assert_eq!(scenario.impact.profit.absolute, dec!(2700));
    }

    #[test]
    fn test_combined_change() {
        let mut engine = ScenarioEngine::new(baseline());
        let scenario = engine.simulate_combined_change(dec!(5), dec!(-5));
        assert_eq!(scenario.name, "Revenue +5%, Cost -5%");
        assert_eq!(scenario.simulated.revenue, dec!(47565));
        assert_eq!(scenario.simulated.cost, dec!(25650));
        assert_eq!(
            scenario.simulated.profit,
            scenario.simulated.revenue - scenario.simulated.cost
        );
    }

    #[test]
    fn test_baseline_never_mutated() {
        let original = baseline();
        let mut engine = ScenarioEngine::new(original.clone());
        engine.simulate_revenue_change(dec!(-50));
        engine.simulate_cost_change(dec!(200));
        assert_eq!(*engine.baseline(), original);
    }

    #[test]
    fn test_full_reduction_still_computes() {
        let mut engine = ScenarioEngine::new(baseline());
        let scenario = engine.simulate_revenue_change(dec!(-100));
        assert_eq!(scenario.simulated.revenue, Decimal::ZERO);
        assert_eq!(scenario.simulated.profit, -scenario.simulated.cost);
        // Margin over zero revenue reports 0
        assert_eq!(scenario.simulated.margin, Decimal::ZERO);
    }

    #[test]
    fn test_zero_baseline_percent_is_none() {
        let ledger = Ledger::from_observations([(date(2024, 1, 1), dec!(0), dec!(100))]);
        let mut engine = ScenarioEngine::new(ledger);
        let scenario = engine.simulate_revenue_change(dec!(10));
        assert_eq!(scenario.impact.revenue.percent, None);
        assert_eq!(scenario.impact.revenue.absolute, Decimal::ZERO);
    }

    #[test]
    fn test_compare_requires_scenarios() {
        let engine = ScenarioEngine::new(baseline());
        assert_eq!(
            engine.compare_scenarios().unwrap_err(),
            AnalysisError::NoScenarios
        );
    }

    #[test]
    fn test_compare_orders_baseline_first() {
        let mut engine = ScenarioEngine::new(baseline());
        engine.simulate_revenue_change(dec!(10));
        engine.simulate_cost_change(dec!(-5));
        let comparison = engine.compare_scenarios().unwrap();
        assert_eq!(comparison.rows.len(), 3);
        assert_eq!(comparison.rows[0].name, "Baseline");
        assert_eq!(comparison.rows[1].name, "Revenue +10%");
        assert_eq!(comparison.rows[2].name, "Cost -5%");
    }

    #[test]
    fn test_best_scenario_by_profit() {
        let mut engine = ScenarioEngine::new(baseline());
        engine.simulate_revenue_change(dec!(10));
        engine.simulate_revenue_change(dec!(20));
        engine.simulate_cost_change(dec!(5));
        let best = engine.best_scenario(ScenarioMetric::Profit).unwrap();
        assert_eq!(best.name, "Revenue +20%");
    }

    #[test]
    fn test_best_scenario_tie_keeps_earliest() {
        let mut engine = ScenarioEngine::new(baseline());
        engine.simulate_named(
            ScenarioKind::RevenueChange { pct: dec!(10) },
            "first",
        );
        engine.simulate_named(
            ScenarioKind::RevenueChange { pct: dec!(10) },
            "second",
        );
        let best = engine.best_scenario(ScenarioMetric::Profit).unwrap();
        assert_eq!(best.name, "first");
    }

    #[test]
    fn test_best_scenario_requires_scenarios() {
        let engine = ScenarioEngine::new(baseline());
        assert_eq!(
            engine.best_scenario(ScenarioMetric::Profit).unwrap_err(),
            AnalysisError::NoScenarios
        );
    }

    #[test]
    fn test_empty_ledger_simulation() {
        let mut engine = ScenarioEngine::new(Ledger::default());
        let scenario = engine.simulate_revenue_change(dec!(10));
        assert_eq!(scenario.baseline.revenue, Decimal::ZERO);
        assert_eq!(scenario.simulated.revenue, Decimal::ZERO);
        assert_eq!(scenario.impact.revenue.percent, None);
    }
}
