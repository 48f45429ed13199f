//! Rule-based risk detection over a ledger: threshold configuration,
//! detection rules, and severity-classified events.

pub mod detector;
pub mod thresholds;
