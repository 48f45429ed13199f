use insight_engine::analytics::metrics::MetricsEngine;
use insight_engine::analytics::trends::{analyze_trends, TrendDirection};
use insight_engine::core::error::AnalysisError;
use insight_engine::core::ledger::Ledger;
use insight_engine::core::metric::Metric;
use insight_engine::risk::detector::{RiskEngine, RiskKind, Severity};
use insight_engine::risk::thresholds::RiskThresholds;
use insight_engine::simulation::scenario::{ScenarioEngine, ScenarioMetric};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Full pipeline: ledger → metrics → risks → scenarios on one dataset.
#[test]
fn full_pipeline_quarterly_review() {
    let ledger = Ledger::from_observations([
        (date(2024, 1, 8), dec!(12000), dec!(7000)),
        (date(2024, 1, 22), dec!(11500), dec!(6800)),
        (date(2024, 2, 5), dec!(9800), dec!(9900)), // loss
        (date(2024, 2, 19), dec!(8700), dec!(9100)), // loss
        (date(2024, 3, 4), dec!(7900), dec!(8200)), // loss
        (date(2024, 3, 18), dec!(14500), dec!(7400)),
    ]);
    assert!(ledger.verify_invariants().is_ok());

    // Metrics
    let summary = MetricsEngine::summary_statistics(&ledger).unwrap();
    assert_eq!(summary.revenue.total, dec!(64400));
    assert_eq!(summary.profit.total, ledger.total_profit());
    assert_eq!(summary.revenue.max, dec!(14500));

    let monthly = MetricsEngine::monthly_aggregates(&ledger);
    assert_eq!(monthly.len(), 3);
    let monthly_revenue: Decimal = monthly.iter().map(|m| m.revenue).sum();
    assert_eq!(monthly_revenue, ledger.total_revenue());

    let trends = analyze_trends(&ledger, 3).unwrap();
    assert_eq!(trends.len(), 3);
    assert_eq!(trends[0].points.len(), 4);

    // Risks: the three-period loss streak must be flagged at the default
    // threshold of 3, severity high (1x threshold)
    let events = RiskEngine::default().detect_all_risks(&ledger);
    let streak = events
        .iter()
        .find(|e| e.kind == RiskKind::NegativeProfitStreak)
        .expect("loss streak should be flagged");
    assert_eq!(streak.severity, Severity::High);
    assert_eq!(streak.period_start, date(2024, 2, 5));
    assert_eq!(streak.period_end, date(2024, 3, 4));

    let summary = RiskEngine::summarize(&events);
    assert_eq!(summary.total, events.len());

    // Scenarios
    let mut scenarios = ScenarioEngine::new(ledger.clone());
    scenarios.simulate_revenue_change(dec!(10));
    scenarios.simulate_cost_change(dec!(-10));
    scenarios.simulate_combined_change(dec!(10), dec!(-10));
    let comparison = scenarios.compare_scenarios().unwrap();
    assert_eq!(comparison.rows.len(), 4);
    assert_eq!(comparison.rows[0].name, "Baseline");

    let best = scenarios.best_scenario(ScenarioMetric::Profit).unwrap();
    assert_eq!(best.name, "Revenue +10%, Cost -10%");

    // Baseline survives every simulation untouched
    assert_eq!(*scenarios.baseline(), ledger);
}

#[test]
fn revenue_uplift_totals_match_hand_computation() {
    // Baseline revenue total 45300 → simulated 49830, impact 4530 / 10.0%
    let ledger = Ledger::from_observations([
        (date(2024, 1, 1), dec!(15000), dec!(9000)),
        (date(2024, 1, 2), dec!(14800), dec!(8500)),
        (date(2024, 1, 3), dec!(15500), dec!(9500)),
    ]);
    let mut engine = ScenarioEngine::new(ledger);
    let scenario = engine.simulate_revenue_change(dec!(10));
    assert_eq!(scenario.baseline.revenue, dec!(45300));
    assert_eq!(scenario.simulated.revenue, dec!(49830));
    assert_eq!(scenario.impact.revenue.absolute, dec!(4530));
    assert_eq!(scenario.impact.revenue.percent, Some(10.0));
}

#[test]
fn six_period_trend_trichotomy() {
    let geometric = |growth: Decimal| {
        let mut revenue = dec!(1000);
        Ledger::from_observations((1..=6).map(|d| {
            let observation = (date(2024, 1, d), revenue, dec!(100));
            revenue *= growth;
            observation
        }))
    };
    let rising = geometric(dec!(1.1));
    let flat = geometric(dec!(1));
    let falling = geometric(dec!(0.9));

    let direction = |ledger: &Ledger| analyze_trends(ledger, 3).unwrap()[0].direction;
    assert_eq!(direction(&rising), TrendDirection::Rising);
    assert_eq!(direction(&flat), TrendDirection::Stable);
    assert_eq!(direction(&falling), TrendDirection::Falling);
}

#[test]
fn threshold_overrides_change_detection() {
    let ledger = Ledger::from_observations([
        (date(2024, 1, 1), dec!(1000), dec!(1100)),
        (date(2024, 1, 2), dec!(1000), dec!(1100)),
    ]);

    // Default streak threshold 3: two losses are not enough
    let default_events = RiskEngine::default().detect_all_risks(&ledger);
    assert!(default_events
        .iter()
        .all(|e| e.kind != RiskKind::NegativeProfitStreak));

    // Lowered to 2, the same ledger trips the rule (streak 2 = 1x threshold)
    let overrides = HashMap::from([("negative_profit_streak".to_string(), dec!(2))]);
    let engine = RiskEngine::new(RiskThresholds::with_overrides(&overrides)).unwrap();
    let events = engine.detect_all_risks(&ledger);
    let streak = events
        .iter()
        .find(|e| e.kind == RiskKind::NegativeProfitStreak)
        .unwrap();
    assert_eq!(streak.severity, Severity::High);
}

#[test]
fn empty_and_single_record_behavior() {
    let empty = Ledger::default();
    assert!(matches!(
        MetricsEngine::summary_statistics(&empty).unwrap_err(),
        AnalysisError::EmptyDataset { .. }
    ));
    assert!(MetricsEngine::profit_margins(&empty).is_empty());
    assert!(MetricsEngine::monthly_aggregates(&empty).is_empty());
    assert!(RiskEngine::default().detect_all_risks(&empty).is_empty());

    let single = Ledger::from_observations([(date(2024, 1, 1), dec!(750), dec!(250))]);
    let report = MetricsEngine::summary_statistics(&single).unwrap();
    assert_eq!(report.revenue.std_dev, 0.0);
    assert_eq!(report.revenue.mean, dec!(750));
    assert_eq!(report.revenue.median, dec!(750));
    assert_eq!(report.revenue.min, dec!(750));
    assert_eq!(report.revenue.max, dec!(750));

    let top = MetricsEngine::top_performing_periods(&single, Metric::Profit, 100).unwrap();
    assert_eq!(top.len(), 1);
}

#[test]
fn serialization_round_trip() {
    let ledger = Ledger::from_observations([
        (date(2024, 1, 1), dec!(1000), dec!(400)),
        (date(2024, 1, 2), dec!(900), dec!(1000)),
    ]);

    let events = RiskEngine::default().detect_all_risks(&ledger);
    let json = serde_json::to_string(&events).unwrap();
    let back: Vec<insight_engine::risk::detector::RiskEvent> =
        serde_json::from_str(&json).unwrap();
    assert_eq!(events, back);

    let mut engine = ScenarioEngine::new(ledger);
    let scenario = engine.simulate_combined_change(dec!(5), dec!(5));
    let json = serde_json::to_string(&scenario).unwrap();
    let back: insight_engine::simulation::scenario::Scenario =
        serde_json::from_str(&json).unwrap();
    assert_eq!(scenario, back);
}
