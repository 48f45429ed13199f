//! What-if simulation: percentage perturbations of revenue/cost against a
//! baseline ledger, plus random sample-ledger generation for testing.

pub mod sample_data;
pub mod scenario;
