use crate::core::error::AnalysisError;
use crate::core::ledger::Ledger;
use crate::risk::thresholds::RiskThresholds;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordinal risk urgency. Ordering is ascending, so `Critical` compares
/// greatest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        })
    }
}

/// The rule that produced a risk event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    NegativeProfitStreak,
    LowProfitMargin,
    HighCostRatio,
    RevenueDrop,
    CostSpike,
}

impl fmt::Display for RiskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskKind::NegativeProfitStreak => "negative_profit_streak",
            RiskKind::LowProfitMargin => "low_profit_margin",
            RiskKind::HighCostRatio => "high_cost_ratio",
            RiskKind::RevenueDrop => "revenue_drop",
            RiskKind::CostSpike => "cost_spike",
        })
    }
}

/// One detected risk, covering a single period or a period range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEvent {
    pub kind: RiskKind,
    pub severity: Severity,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub description: String,
    /// The value that tripped the rule (margin, ratio, streak length, ...).
    /// `None` when the value is undefined, e.g. a cost ratio over zero
    /// revenue.
    pub observed: Option<Decimal>,
    /// The configured threshold the value was compared against.
    pub threshold: Decimal,
}

/// Counts of detected events grouped by severity and by rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub by_kind: BTreeMap<RiskKind, usize>,
}

/// The risk engine.
///
/// Holds an immutable threshold configuration; every detection run is
/// stateless given a ledger, rebuilding the event list from scratch.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    thresholds: RiskThresholds,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
        }
    }
}

impl RiskEngine {
    /// Build an engine with an explicit threshold configuration.
    ///
    /// A streak threshold of zero would flag every record unconditionally
    /// and is rejected as an invalid parameter.
    pub fn new(thresholds: RiskThresholds) -> Result<Self, AnalysisError> {
        if thresholds.negative_profit_streak == 0 {
            return Err(AnalysisError::InvalidParameter {
                name: "negative_profit_streak",
                reason: "must be at least 1".into(),
            });
        }
        for (name, value) in [
            ("high_cost_ratio", thresholds.high_cost_ratio),
            ("revenue_drop_pct", thresholds.revenue_drop_pct),
            ("cost_spike_pct", thresholds.cost_spike_pct),
        ] {
            if value < Decimal::ZERO {
                return Err(AnalysisError::InvalidParameter {
                    name,
                    reason: format!("must be non-negative, got {value}"),
                });
            }
        }
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Run every rule in fixed order and return the rebuilt event list.
    ///
    /// Rules are independent; none short-circuits another. The fixed order
    /// exists only so output is deterministic. An empty ledger yields an
    /// empty list.
    pub fn detect_all_risks(&self, ledger: &Ledger) -> Vec<RiskEvent> {
        let mut events = Vec::new();
        self.detect_negative_profit_streaks(ledger, &mut events);
        self.detect_low_profit_margin(ledger, &mut events);
        self.detect_high_cost_ratio(ledger, &mut events);
        self.detect_revenue_drops(ledger, &mut events);
        self.detect_cost_spikes(ledger, &mut events);
        events
    }

    /// One event per maximal run of consecutive negative-profit periods at
    /// least as long as the streak threshold. A run twice the threshold or
    /// longer escalates to critical.
    fn detect_negative_profit_streaks(&self, ledger: &Ledger, events: &mut Vec<RiskEvent>) {
        let threshold = self.thresholds.negative_profit_streak;
        let records = ledger.records();

        let mut start = None;
        for i in 0..=records.len() {
            let negative = records
                .get(i)
                .map(|r| r.profit() < Decimal::ZERO)
                .unwrap_or(false);
            match (start, negative) {
                (None, true) => start = Some(i),
                (Some(s), false) => {
                    let len = i - s;
                    if len >= threshold {
                        let severity = if len >= 2 * threshold {
                            Severity::Critical
                        } else {
                            Severity::High
                        };
                        events.push(RiskEvent {
                            kind: RiskKind::NegativeProfitStreak,
                            severity,
                            period_start: records[s].period(),
                            period_end: records[i - 1].period(),
                            description: format!(
                                "negative profit for {} consecutive period(s) from {} to {}",
                                len,
                                records[s].period(),
                                records[i - 1].period()
                            ),
                            observed: Some(Decimal::from(len as u64)),
                            threshold: Decimal::from(threshold as u64),
                        });
                    }
                    start = None;
                }
                _ => {}
            }
        }
    }

    /// Per-record low margin check; not aggregated across periods.
    fn detect_low_profit_margin(&self, ledger: &Ledger, events: &mut Vec<RiskEvent>) {
        for record in ledger.records() {
            if record.margin() < self.thresholds.low_profit_margin {
                events.push(RiskEvent {
                    kind: RiskKind::LowProfitMargin,
                    severity: Severity::Medium,
                    period_start: record.period(),
                    period_end: record.period(),
                    description: format!(
                        "profit margin {}% below {}% on {}",
                        record.margin().round_dp(2),
                        self.thresholds.low_profit_margin,
                        record.period()
                    ),
                    observed: Some(record.margin()),
                    threshold: self.thresholds.low_profit_margin,
                });
            }
        }
    }

    /// Per-record cost/revenue ratio check. Zero revenue with non-zero cost
    /// counts as an infinite ratio and always triggers.
    fn detect_high_cost_ratio(&self, ledger: &Ledger, events: &mut Vec<RiskEvent>) {
        for record in ledger.records() {
            let ratio = if record.revenue() == Decimal::ZERO {
                if record.cost() > Decimal::ZERO {
                    None // +infinity
                } else {
                    continue;
                }
            } else {
                let ratio = record.cost() / record.revenue() * dec!(100);
                if ratio <= self.thresholds.high_cost_ratio {
                    continue;
                }
                Some(ratio)
            };

            let description = match ratio {
                Some(r) => format!(
                    "cost ratio {}% above {}% on {}",
                    r.round_dp(2),
                    self.thresholds.high_cost_ratio,
                    record.period()
                ),
                None => format!(
                    "cost {} with zero revenue on {}",
                    record.cost(),
                    record.period()
                ),
            };
            events.push(RiskEvent {
                kind: RiskKind::HighCostRatio,
                severity: Severity::High,
                period_start: record.period(),
                period_end: record.period(),
                description,
                observed: ratio,
                threshold: self.thresholds.high_cost_ratio,
            });
        }
    }

    /// Records whose revenue sits more than the threshold percentage below
    /// the ledger-wide mean.
    fn detect_revenue_drops(&self, ledger: &Ledger, events: &mut Vec<RiskEvent>) {
        let mean = match ledger.mean_revenue() {
            Some(mean) if mean > Decimal::ZERO => mean,
            _ => return, // all-zero revenue admits no drop below the mean
        };
        for record in ledger.records() {
            let drop_pct = (mean - record.revenue()) / mean * dec!(100);
            if drop_pct > self.thresholds.revenue_drop_pct {
                events.push(RiskEvent {
                    kind: RiskKind::RevenueDrop,
                    severity: Severity::Medium,
                    period_start: record.period(),
                    period_end: record.period(),
                    description: format!(
                        "revenue {} is {}% below the mean of {} on {}",
                        record.revenue(),
                        drop_pct.round_dp(2),
                        mean.round_dp(2),
                        record.period()
                    ),
                    observed: Some(drop_pct),
                    threshold: self.thresholds.revenue_drop_pct,
                });
            }
        }
    }

    /// Records whose cost sits more than the threshold percentage above the
    /// ledger-wide mean.
    fn detect_cost_spikes(&self, ledger: &Ledger, events: &mut Vec<RiskEvent>) {
        let mean = match ledger.mean_cost() {
            Some(mean) if mean > Decimal::ZERO => mean,
            _ => return,
        };
        for record in ledger.records() {
            let spike_pct = (record.cost() - mean) / mean * dec!(100);
            if spike_pct > self.thresholds.cost_spike_pct {
                events.push(RiskEvent {
                    kind: RiskKind::CostSpike,
                    severity: Severity::High,
                    period_start: record.period(),
                    period_end: record.period(),
                    description: format!(
                        "cost {} is {}% above the mean of {} on {}",
                        record.cost(),
                        spike_pct.round_dp(2),
                        mean.round_dp(2),
                        record.period()
                    ),
                    observed: Some(spike_pct),
                    threshold: self.thresholds.cost_spike_pct,
                });
            }
        }
    }

    /// Counts grouped by severity and by rule. Empty input yields all-zero
    /// counts, not an error.
    pub fn summarize(events: &[RiskEvent]) -> RiskSummary {
        let mut summary = RiskSummary {
            total: events.len(),
            ..RiskSummary::default()
        };
        for event in events {
            match event.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
            *summary.by_kind.entry(event.kind).or_insert(0) += 1;
        }
        summary
    }
}
