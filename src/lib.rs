//! # insight-engine
//!
//! Rule-based financial analytics over a time-ordered ledger of revenue and
//! cost observations.
//!
//! Given a validated record sequence, the engine derives metrics, flags
//! risks, and projects what-if scenarios. Ingestion, chart rendering, and
//! report narration are thin collaborators around this core.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: records, the ledger, metrics, errors
//! - **analytics** — Summary statistics, margins, aggregation, trend analysis
//! - **risk** — Threshold-driven risk rules with severity classification
//! - **simulation** — What-if scenarios and random sample data

pub mod analytics;
pub mod core;
pub mod risk;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::analytics::metrics::{MetricsEngine, SummaryReport};
    pub use crate::analytics::trends::{analyze_trends, TrendDirection, TrendResult};
    pub use crate::core::error::AnalysisError;
    pub use crate::core::ledger::Ledger;
    pub use crate::core::metric::Metric;
    pub use crate::core::record::Record;
    pub use crate::risk::detector::{RiskEngine, RiskEvent, RiskSummary, Severity};
    pub use crate::risk::thresholds::RiskThresholds;
    pub use crate::simulation::scenario::{Scenario, ScenarioEngine, ScenarioMetric};
}
