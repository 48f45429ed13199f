use crate::core::metric::Metric;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One period's financial observation plus its derived fields.
///
/// `profit` and `margin` are always consistent with `revenue` and `cost`:
/// they are computed at construction and recomputed whenever revenue or cost
/// change (e.g. under scenario simulation). They are never set directly.
///
/// # Examples
///
/// ```
/// use insight_engine::core::record::Record;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let r = Record::new(
///     NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
///     dec!(1200),
///     dec!(800),
/// );
/// assert_eq!(r.profit(), dec!(400));
/// assert_eq!(r.margin().round_dp(2), dec!(33.33));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The period this observation covers.
    period: NaiveDate,
    /// Revenue for the period. Must be non-negative.
    revenue: Decimal,
    /// Cost for the period. Must be non-negative.
    cost: Decimal,
    /// Derived: revenue − cost.
    profit: Decimal,
    /// Derived: profit / revenue × 100, or 0 when revenue is zero.
    margin: Decimal,
}

impl Record {
    /// Create a record, deriving profit and margin.
    ///
    /// # Panics
    ///
    /// Panics if `revenue` or `cost` is negative. Input validation belongs
    /// to the ingestion layer; negative values here are a precondition
    /// violation.
    pub fn new(period: NaiveDate, revenue: Decimal, cost: Decimal) -> Self {
        assert!(
            revenue >= Decimal::ZERO,
            "Record revenue must be non-negative, got {}",
            revenue
        );
        assert!(
            cost >= Decimal::ZERO,
            "Record cost must be non-negative, got {}",
            cost
        );
        let profit = revenue - cost;
        Self {
            period,
            revenue,
            cost,
            profit,
            margin: margin_of(profit, revenue),
        }
    }

    /// Copy of this record with a different revenue; profit/margin re-derived.
    ///
    /// Simulation may drive revenue negative (e.g. a −120% shock); derived
    /// fields are still computed rather than rejected.
    pub fn with_revenue(&self, revenue: Decimal) -> Self {
        let profit = revenue - self.cost;
        Self {
            period: self.period,
            revenue,
            cost: self.cost,
            profit,
            margin: margin_of(profit, revenue),
        }
    }

    /// Copy of this record with a different cost; profit/margin re-derived.
    pub fn with_cost(&self, cost: Decimal) -> Self {
        let profit = self.revenue - cost;
        Self {
            period: self.period,
            revenue: self.revenue,
            cost,
            profit,
            margin: margin_of(profit, self.revenue),
        }
    }

    // --- Accessors ---

    pub fn period(&self) -> NaiveDate {
        self.period
    }

    pub fn revenue(&self) -> Decimal {
        self.revenue
    }

    pub fn cost(&self) -> Decimal {
        self.cost
    }

    pub fn profit(&self) -> Decimal {
        self.profit
    }

    pub fn margin(&self) -> Decimal {
        self.margin
    }

    /// Value of the given base metric for this record.
    pub fn metric(&self, metric: Metric) -> Decimal {
        match metric {
            Metric::Revenue => self.revenue,
            Metric::Cost => self.cost,
            Metric::Profit => self.profit,
        }
    }
}

/// Profit margin as a percentage; zero revenue yields 0, not an error.
pub(crate) fn margin_of(profit: Decimal, revenue: Decimal) -> Decimal {
    if revenue == Decimal::ZERO {
        Decimal::ZERO
    } else {
        profit / revenue * Decimal::from(100)
    }
}
