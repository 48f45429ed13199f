use crate::core::error::AnalysisError;
use crate::core::record::{margin_of, Record};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The time-ordered sequence of financial records under analysis.
///
/// Records are sorted by period on construction (stable sort, so duplicate
/// periods, an upstream data-quality problem, keep their input order).
/// The ledger is treated as immutable once built: every engine either reads
/// it or clones it, never mutates it in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    records: Vec<Record>,
}

impl Ledger {
    /// Build a ledger from records, sorting by period.
    pub fn new(mut records: Vec<Record>) -> Self {
        records.sort_by_key(Record::period);
        Self { records }
    }

    /// Build a ledger from raw (period, revenue, cost) observations.
    pub fn from_observations(
        observations: impl IntoIterator<Item = (NaiveDate, Decimal, Decimal)>,
    ) -> Self {
        Self::new(
            observations
                .into_iter()
                .map(|(period, revenue, cost)| Record::new(period, revenue, cost))
                .collect(),
        )
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total revenue across all records.
    pub fn total_revenue(&self) -> Decimal {
        self.records.iter().map(Record::revenue).sum()
    }

    /// Total cost across all records.
    pub fn total_cost(&self) -> Decimal {
        self.records.iter().map(Record::cost).sum()
    }

    /// Total profit across all records.
    pub fn total_profit(&self) -> Decimal {
        self.records.iter().map(Record::profit).sum()
    }

    /// Overall margin derived from summed totals, not averaged per-record
    /// margins. Zero total revenue yields 0.
    pub fn overall_margin(&self) -> Decimal {
        margin_of(self.total_profit(), self.total_revenue())
    }

    /// Mean revenue; `None` for an empty ledger.
    pub fn mean_revenue(&self) -> Option<Decimal> {
        self.mean_of(Record::revenue)
    }

    /// Mean cost; `None` for an empty ledger.
    pub fn mean_cost(&self) -> Option<Decimal> {
        self.mean_of(Record::cost)
    }

    fn mean_of(&self, f: impl Fn(&Record) -> Decimal) -> Option<Decimal> {
        if self.records.is_empty() {
            return None;
        }
        let sum: Decimal = self.records.iter().map(f).sum();
        Some(sum / Decimal::from(self.records.len() as u64))
    }

    /// Check the structural invariants the engines rely on: periods
    /// non-decreasing, no duplicates, revenue and cost non-negative.
    ///
    /// A failure here is a precondition violation by whoever built the
    /// ledger, never silently corrected.
    pub fn verify_invariants(&self) -> Result<(), AnalysisError> {
        for pair in self.records.windows(2) {
            if pair[0].period() > pair[1].period() {
                return Err(AnalysisError::InvariantViolation(format!(
                    "records out of order: {} after {}",
                    pair[1].period(),
                    pair[0].period()
                )));
            }
            if pair[0].period() == pair[1].period() {
                return Err(AnalysisError::InvariantViolation(format!(
                    "duplicate period {}",
                    pair[0].period()
                )));
            }
        }
        for record in &self.records {
            if record.revenue() < Decimal::ZERO || record.cost() < Decimal::ZERO {
                return Err(AnalysisError::InvariantViolation(format!(
                    "negative observation at {}",
                    record.period()
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<Record> for Ledger {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
