//! Foundational types shared by all engines: records, the ledger,
//! metric selectors, and the error taxonomy.

pub mod error;
pub mod ledger;
pub mod metric;
pub mod record;
