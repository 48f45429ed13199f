//! Derived metrics: summary statistics, margins, aggregation, ranking,
//! and moving-average trend classification.

pub mod metrics;
pub mod trends;
