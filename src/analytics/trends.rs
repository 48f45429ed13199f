use crate::core::error::AnalysisError;
use crate::core::ledger::Ledger;
use crate::core::metric::Metric;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall direction of a moving-average series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendDirection::Rising => "rising",
            TrendDirection::Falling => "falling",
            TrendDirection::Stable => "stable",
        })
    }
}

/// One averaged observation: the raw value and the trailing moving average
/// ending at this period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: NaiveDate,
    pub value: Decimal,
    pub moving_average: Decimal,
}

/// Moving-average trend for one metric.
///
/// Periods before the window is filled are omitted (no padding), so the
/// series holds `ledger.len() − window + 1` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub metric: Metric,
    pub window: usize,
    pub points: Vec<TrendPoint>,
    pub direction: TrendDirection,
}

/// Trailing moving-average trend analysis for revenue, cost, and profit.
///
/// Direction is classified by comparing the first averaged point to the
/// last: a relative change of at least +5% is rising, at most −5% is
/// falling, anything between is stable. This whole-range two-point
/// comparison is the published contract; intermediate reversals do not
/// influence it.
pub fn analyze_trends(ledger: &Ledger, window: usize) -> Result<Vec<TrendResult>, AnalysisError> {
    if ledger.is_empty() {
        return Err(AnalysisError::EmptyDataset {
            operation: "analyze_trends",
        });
    }
    if window < 1 {
        return Err(AnalysisError::InvalidParameter {
            name: "window",
            reason: "must be at least 1".into(),
        });
    }
    if window > ledger.len() {
        return Err(AnalysisError::InvalidParameter {
            name: "window",
            reason: format!(
                "window {} exceeds ledger length {}",
                window,
                ledger.len()
            ),
        });
    }

    Ok(Metric::ALL
        .iter()
        .map(|&metric| trend_for_metric(ledger, metric, window))
        .collect())
}

fn trend_for_metric(ledger: &Ledger, metric: Metric, window: usize) -> TrendResult {
    let records = ledger.records();
    let values: Vec<Decimal> = records.iter().map(|r| r.metric(metric)).collect();

    let mut points = Vec::with_capacity(values.len() - window + 1);
    let mut window_sum: Decimal = values[..window].iter().copied().sum();
    let divisor = Decimal::from(window as u64);

    points.push(TrendPoint {
        period: records[window - 1].period(),
        value: values[window - 1],
        moving_average: window_sum / divisor,
    });
    for i in window..values.len() {
        window_sum += values[i] - values[i - window];
        points.push(TrendPoint {
            period: records[i].period(),
            value: values[i],
            moving_average: window_sum / divisor,
        });
    }

    let direction = classify_direction(&points);
    TrendResult {
        metric,
        window,
        points,
        direction,
    }
}

/// First-to-last moving-average comparison with a ±5% band.
fn classify_direction(points: &[TrendPoint]) -> TrendDirection {
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (f.moving_average, l.moving_average),
        _ => return TrendDirection::Stable,
    };

    // A zero starting average makes relative change undefined; the sign of
    // the final average decides instead.
    if first == Decimal::ZERO {
        return if last > Decimal::ZERO {
            TrendDirection::Rising
        } else if last < Decimal::ZERO {
            TrendDirection::Falling
        } else {
            TrendDirection::Stable
        };
    }

    let pct_change = (last - first) / first * dec!(100);
    if pct_change >= dec!(5) {
        TrendDirection::Rising
    } else if pct_change <= dec!(-5) {
        TrendDirection::Falling
    } else {
        TrendDirection::Stable
    }
}
