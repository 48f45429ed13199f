//! insight-engine CLI
//!
//! Run financial analysis from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Summary statistics, trends, monthly aggregates, top periods
//! insight-engine analyze --input records.json
//!
//! # Risk detection with a custom threshold
//! insight-engine risks --input records.json --threshold low_profit_margin=15
//!
//! # What-if scenarios
//! insight-engine simulate --input records.json --revenue 10 --cost -5
//!
//! # Generate a random ledger for testing
//! insight-engine generate --periods 60 --output records.json
//! ```

use insight_engine::analytics::metrics::MetricsEngine;
use insight_engine::analytics::trends::analyze_trends;
use insight_engine::core::ledger::Ledger;
use insight_engine::core::metric::Metric;
use insight_engine::core::record::Record;
use insight_engine::risk::detector::RiskEngine;
use insight_engine::risk::thresholds::RiskThresholds;
use insight_engine::simulation::sample_data::{generate_random_ledger, SampleConfig};
use insight_engine::simulation::scenario::{ScenarioEngine, ScenarioMetric};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"insight-engine — rule-based financial analytics

USAGE:
    insight-engine <COMMAND> [OPTIONS]

COMMANDS:
    analyze     Summary statistics, trends, monthly aggregates, top periods
    risks       Run risk detection and print the risk summary
    simulate    Run what-if revenue/cost scenarios
    generate    Generate a random ledger (for testing)
    help        Show this message

OPTIONS (analyze):
    --input <FILE>       Path to JSON records file
    --window <N>         Moving-average window (default: 3)
    --top <N>            Number of top periods to show (default: 5)
    --format <FORMAT>    Output format: text (default) or json

OPTIONS (risks):
    --input <FILE>       Path to JSON records file
    --threshold <K=V>    Override a threshold (repeatable)
    --format <FORMAT>    Output format: text (default) or json

OPTIONS (simulate):
    --input <FILE>       Path to JSON records file
    --revenue <PCT>      Revenue change percentage
    --cost <PCT>         Cost change percentage
    --format <FORMAT>    Output format: text (default) or json

OPTIONS (generate):
    --periods <N>        Number of daily periods (default: 30)
    --output <FILE>      Write to file instead of stdout

EXAMPLES:
    insight-engine analyze --input records.json --window 7
    insight-engine risks --input records.json --threshold cost_spike_pct=40
    insight-engine simulate --input records.json --revenue 10
    insight-engine generate --periods 90 --output records.json"#
    );
}

/// JSON schema for input records.
#[derive(serde::Deserialize)]
struct RecordInput {
    period: NaiveDate,
    revenue: String,
    cost: String,
}

#[derive(serde::Deserialize)]
struct RecordsFile {
    records: Vec<RecordInput>,
}

#[derive(serde::Serialize)]
struct RecordOutput {
    period: NaiveDate,
    revenue: String,
    cost: String,
}

#[derive(serde::Serialize)]
struct RecordsOutput {
    records: Vec<RecordOutput>,
}

fn load_ledger(path: &str) -> Ledger {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: RecordsFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "records": [
    {{ "period": "2024-01-05", "revenue": "1200.50", "cost": "800" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let mut records = Vec::with_capacity(file.records.len());
    for input in file.records {
        let revenue: Decimal = input.revenue.parse().unwrap_or_else(|e| {
            eprintln!("Invalid revenue '{}': {}", input.revenue, e);
            process::exit(1);
        });
        let cost: Decimal = input.cost.parse().unwrap_or_else(|e| {
            eprintln!("Invalid cost '{}': {}", input.cost, e);
            process::exit(1);
        });
        if revenue < Decimal::ZERO || cost < Decimal::ZERO {
            eprintln!(
                "Record {} has a negative value; revenue and cost must be >= 0",
                input.period
            );
            process::exit(1);
        }
        records.push(Record::new(input.period, revenue, cost));
    }

    let ledger = Ledger::new(records);
    if let Err(e) = ledger.verify_invariants() {
        eprintln!("Invalid ledger: {}", e);
        process::exit(1);
    }
    ledger
}

/// Pull the value following a flag, exiting with a message if absent.
fn take_value(args: &[String], i: &mut usize, flag: &str) -> String {
    *i += 1;
    args.get(*i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires a value", flag);
        process::exit(1);
    })
}

fn cmd_analyze(args: &[String]) {
    let mut input_path = None;
    let mut window = 3usize;
    let mut top_n = 5usize;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input_path = Some(take_value(args, &mut i, "--input")),
            "--window" => {
                window = take_value(args, &mut i, "--window").parse().unwrap_or_else(|_| {
                    eprintln!("--window requires a number");
                    process::exit(1);
                })
            }
            "--top" => {
                top_n = take_value(args, &mut i, "--top").parse().unwrap_or_else(|_| {
                    eprintln!("--top requires a number");
                    process::exit(1);
                })
            }
            "--format" => format = take_value(args, &mut i, "--format"),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    let ledger = load_ledger(&path);

    let summary = MetricsEngine::summary_statistics(&ledger).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });
    let trends = analyze_trends(&ledger, window).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });
    let monthly = MetricsEngine::monthly_aggregates(&ledger);
    let top = MetricsEngine::top_performing_periods(&ledger, Metric::Profit, top_n)
        .unwrap_or_else(|e| {
            eprintln!("{}", e);
            process::exit(1);
        });

    if format == "json" {
        #[derive(serde::Serialize)]
        struct AnalyzeOutput<'a> {
            summary: &'a insight_engine::analytics::metrics::SummaryReport,
            trends: &'a [insight_engine::analytics::trends::TrendResult],
            monthly: &'a [insight_engine::analytics::metrics::MonthlyAggregate],
            top_periods: &'a [Record],
        }
        let output = AnalyzeOutput {
            summary: &summary,
            trends: &trends,
            monthly: &monthly,
            top_periods: &top,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return;
    }

    println!("=== Summary Statistics ===");
    for metric in Metric::ALL {
        let stats = summary.metric(metric);
        println!(
            "{:<8} total {:>14} mean {:>12} median {:>12} std {:>10.2} min {:>12} max {:>12}",
            metric,
            stats.total.round_dp(2),
            stats.mean.round_dp(2),
            stats.median.round_dp(2),
            stats.std_dev,
            stats.min.round_dp(2),
            stats.max.round_dp(2),
        );
    }

    println!("\n=== Trends (window {}) ===", window);
    for trend in &trends {
        println!("{:<8} {}", trend.metric, trend.direction);
    }

    println!("\n=== Monthly Aggregates ===");
    for month in &monthly {
        println!(
            "{}  revenue {:>14} cost {:>14} profit {:>14} margin {:>7}%",
            month.month,
            month.revenue.round_dp(2),
            month.cost.round_dp(2),
            month.profit.round_dp(2),
            month.margin.round_dp(2),
        );
    }

    println!("\n=== Top {} Periods by Profit ===", top.len());
    for record in &top {
        println!(
            "{}  revenue {:>14} cost {:>14} profit {:>14}",
            record.period(),
            record.revenue().round_dp(2),
            record.cost().round_dp(2),
            record.profit().round_dp(2),
        );
    }
}

fn cmd_risks(args: &[String]) {
    let mut input_path = None;
    let mut overrides: HashMap<String, Decimal> = HashMap::new();
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input_path = Some(take_value(args, &mut i, "--input")),
            "--threshold" => {
                let pair = take_value(args, &mut i, "--threshold");
                let (key, value) = pair.split_once('=').unwrap_or_else(|| {
                    eprintln!("--threshold expects name=value, got '{}'", pair);
                    process::exit(1);
                });
                let value: Decimal = value.parse().unwrap_or_else(|e| {
                    eprintln!("Invalid threshold value '{}': {}", value, e);
                    process::exit(1);
                });
                overrides.insert(key.to_string(), value);
            }
            "--format" => format = take_value(args, &mut i, "--format"),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    let ledger = load_ledger(&path);

    let thresholds = RiskThresholds::with_overrides(&overrides);
    let engine = RiskEngine::new(thresholds).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });
    let events = engine.detect_all_risks(&ledger);
    let summary = RiskEngine::summarize(&events);

    if format == "json" {
        #[derive(serde::Serialize)]
        struct RisksOutput<'a> {
            events: &'a [insight_engine::risk::detector::RiskEvent],
            summary: &'a insight_engine::risk::detector::RiskSummary,
        }
        let output = RisksOutput {
            events: &events,
            summary: &summary,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return;
    }

    if events.is_empty() {
        println!("No risks detected.");
        return;
    }

    println!("=== Detected Risks ===");
    for event in &events {
        println!("[{:<8}] {}", event.severity, event.description);
    }
    println!(
        "\nTotal: {} (critical {}, high {}, medium {}, low {})",
        summary.total, summary.critical, summary.high, summary.medium, summary.low
    );
}

fn cmd_simulate(args: &[String]) {
    let mut input_path = None;
    let mut revenue_pct: Option<Decimal> = None;
    let mut cost_pct: Option<Decimal> = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input_path = Some(take_value(args, &mut i, "--input")),
            "--revenue" => {
                let value = take_value(args, &mut i, "--revenue");
                revenue_pct = Some(value.parse().unwrap_or_else(|e| {
                    eprintln!("Invalid percentage '{}': {}", value, e);
                    process::exit(1);
                }));
            }
            "--cost" => {
                let value = take_value(args, &mut i, "--cost");
                cost_pct = Some(value.parse().unwrap_or_else(|e| {
                    eprintln!("Invalid percentage '{}': {}", value, e);
                    process::exit(1);
                }));
            }
            "--format" => format = take_value(args, &mut i, "--format"),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    if revenue_pct.is_none() && cost_pct.is_none() {
        eprintln!("Error: at least one of --revenue or --cost is required");
        process::exit(1);
    }

    let ledger = load_ledger(&path);
    let mut engine = ScenarioEngine::new(ledger);

    if let Some(pct) = revenue_pct {
        engine.simulate_revenue_change(pct);
    }
    if let Some(pct) = cost_pct {
        engine.simulate_cost_change(pct);
    }
    if let (Some(rev), Some(cost)) = (revenue_pct, cost_pct) {
        engine.simulate_combined_change(rev, cost);
    }

    let comparison = engine.compare_scenarios().unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });
    let best = engine.best_scenario(ScenarioMetric::Profit).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });

    if format == "json" {
        #[derive(serde::Serialize)]
        struct SimulateOutput<'a> {
            scenarios: &'a [insight_engine::simulation::scenario::Scenario],
            best_by_profit: &'a str,
        }
        let output = SimulateOutput {
            scenarios: engine.scenarios(),
            best_by_profit: &best.name,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return;
    }

    println!("{}", comparison);
    println!("Best by profit: {}", best.name);
}

fn cmd_generate(args: &[String]) {
    let mut periods = 30usize;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--periods" => {
                periods = take_value(args, &mut i, "--periods").parse().unwrap_or_else(|_| {
                    eprintln!("--periods requires a number");
                    process::exit(1);
                })
            }
            "--output" => output_path = Some(take_value(args, &mut i, "--output")),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = SampleConfig {
        periods,
        ..SampleConfig::default()
    };
    let ledger = generate_random_ledger(&config);

    let output = RecordsOutput {
        records: ledger
            .records()
            .iter()
            .map(|r| RecordOutput {
                period: r.period(),
                revenue: r.revenue().to_string(),
                cost: r.cost().to_string(),
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&output).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!("Generated {} records → {}", ledger.len(), path);
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "analyze" => cmd_analyze(rest),
        "risks" => cmd_risks(rest),
        "simulate" => cmd_simulate(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
