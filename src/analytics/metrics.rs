use crate::core::error::AnalysisError;
use crate::core::ledger::Ledger;
use crate::core::metric::Metric;
use crate::core::record::{margin_of, Record};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Descriptive statistics for one metric over the full ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total: Decimal,
    pub mean: Decimal,
    pub median: Decimal,
    /// Sample (n−1) standard deviation; 0 for a single record.
    pub std_dev: f64,
    pub min: Decimal,
    pub max: Decimal,
}

/// Summary statistics for revenue, cost, and profit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub revenue: SummaryStatistics,
    pub cost: SummaryStatistics,
    pub profit: SummaryStatistics,
}

impl SummaryReport {
    pub fn metric(&self, metric: Metric) -> &SummaryStatistics {
        match metric {
            Metric::Revenue => &self.revenue,
            Metric::Cost => &self.cost,
            Metric::Profit => &self.profit,
        }
    }
}

/// One calendar month's summed totals with margin derived from the sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    /// Calendar month in `YYYY-MM` form.
    pub month: String,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub margin: Decimal,
}

/// The metrics engine.
///
/// Stateless: every operation is a pure function over a borrowed ledger.
pub struct MetricsEngine;

impl MetricsEngine {
    /// Summary statistics for revenue, cost, and profit over the full ledger.
    ///
    /// A single-record ledger yields a standard deviation of 0 and
    /// mean = median = min = max.
    pub fn summary_statistics(ledger: &Ledger) -> Result<SummaryReport, AnalysisError> {
        if ledger.is_empty() {
            return Err(AnalysisError::EmptyDataset {
                operation: "summary_statistics",
            });
        }
        Ok(SummaryReport {
            revenue: Self::statistics_of(ledger, Metric::Revenue),
            cost: Self::statistics_of(ledger, Metric::Cost),
            profit: Self::statistics_of(ledger, Metric::Profit),
        })
    }

    fn statistics_of(ledger: &Ledger, metric: Metric) -> SummaryStatistics {
        let values: Vec<Decimal> = ledger.records().iter().map(|r| r.metric(metric)).collect();
        let n = Decimal::from(values.len() as u64);
        let total: Decimal = values.iter().copied().sum();
        let mean = total / n;

        let mut sorted = values.clone();
        sorted.sort();
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / Decimal::from(2)
        } else {
            sorted[mid]
        };

        SummaryStatistics {
            total,
            mean,
            median,
            std_dev: sample_std_dev(&values),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        }
    }

    /// Per-record profit margin sequence.
    ///
    /// Zero revenue yields a margin of 0 for that record, never an error.
    /// An empty ledger yields an empty sequence.
    pub fn profit_margins(ledger: &Ledger) -> Vec<(NaiveDate, Decimal)> {
        ledger
            .records()
            .iter()
            .map(|r| (r.period(), r.margin()))
            .collect()
    }

    /// Group records by calendar month and sum revenue/cost, deriving profit
    /// and margin from the summed totals (not an average of margins).
    ///
    /// Months with no records are omitted, not zero-filled. An empty ledger
    /// yields an empty sequence.
    pub fn monthly_aggregates(ledger: &Ledger) -> Vec<MonthlyAggregate> {
        let mut aggregates: Vec<MonthlyAggregate> = Vec::new();

        // Records are period-sorted, so each month forms a contiguous run.
        for record in ledger.records() {
            let month = record.period().format("%Y-%m").to_string();
            match aggregates.last_mut() {
                Some(current) if current.month == month => {
                    current.revenue += record.revenue();
                    current.cost += record.cost();
                    current.profit += record.profit();
                    current.margin = margin_of(current.profit, current.revenue);
                }
                _ => aggregates.push(MonthlyAggregate {
                    month,
                    revenue: record.revenue(),
                    cost: record.cost(),
                    profit: record.profit(),
                    margin: record.margin(),
                }),
            }
        }

        aggregates
    }

    /// The `top_n` records ranked descending by the chosen metric, ties
    /// broken by earlier period.
    ///
    /// `top_n` larger than the ledger returns every record; `top_n` of 0 is
    /// an invalid parameter.
    pub fn top_performing_periods(
        ledger: &Ledger,
        metric: Metric,
        top_n: usize,
    ) -> Result<Vec<Record>, AnalysisError> {
        if top_n == 0 {
            return Err(AnalysisError::InvalidParameter {
                name: "top_n",
                reason: "must be at least 1".into(),
            });
        }

        let mut ranked: Vec<Record> = ledger.records().to_vec();
        ranked.sort_by(|a, b| {
            b.metric(metric)
                .cmp(&a.metric(metric))
                .then(a.period().cmp(&b.period()))
        });
        ranked.truncate(top_n);
        Ok(ranked)
    }
}

/// Sample (n−1) standard deviation; defined as 0 for n = 1.
fn sample_std_dev(values: &[Decimal]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let floats: Vec<f64> = values
        .iter()
        .map(|v| v.to_string().parse::<f64>().unwrap_or(0.0))
        .collect();
    let mean = floats.iter().sum::<f64>() / floats.len() as f64;
    let variance = floats
        .iter()
        .map(|v| (v - mean) * (v - mean))
        .sum::<f64>()
        / (floats.len() - 1) as f64;
    variance.sqrt()
}
