//! Random ledger generation for testing and benchmarking.
//!
//! Produces daily records with revenue and cost drawn uniformly from
//! configurable ranges.

use crate::core::ledger::Ledger;
use crate::core::record::Record;
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for generating a random ledger.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Number of daily periods to generate.
    pub periods: usize,
    /// First period.
    pub start: NaiveDate,
    /// Minimum daily revenue.
    pub min_revenue: Decimal,
    /// Maximum daily revenue.
    pub max_revenue: Decimal,
    /// Minimum daily cost.
    pub min_cost: Decimal,
    /// Maximum daily cost.
    pub max_cost: Decimal,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            periods: 30,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            min_revenue: Decimal::from(800),
            max_revenue: Decimal::from(2000),
            min_cost: Decimal::from(500),
            max_cost: Decimal::from(1500),
        }
    }
}

/// Generate a random ledger for testing.
pub fn generate_random_ledger(config: &SampleConfig) -> Ledger {
    let mut rng = rand::thread_rng();

    let records = (0..config.periods)
        .map(|i| {
            let period = config.start + Duration::days(i as i64);
            Record::new(
                period,
                random_amount(&mut rng, config.min_revenue, config.max_revenue),
                random_amount(&mut rng, config.min_cost, config.max_cost),
            )
        })
        .collect();

    Ledger::new(records)
}

fn random_amount(rng: &mut impl Rng, min: Decimal, max: Decimal) -> Decimal {
    let min_f64: f64 = min.to_string().parse().unwrap_or(0.0);
    let max_f64: f64 = max.to_string().parse().unwrap_or(1000.0);
    if min_f64 >= max_f64 {
        return min;
    }
    let amount = rng.gen_range(min_f64..max_f64);
    Decimal::from_f64_retain(amount)
        .unwrap_or(min)
        .round_dp(2)
        .max(Decimal::ZERO)
}
