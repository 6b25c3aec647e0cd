use alerter::{AlertBoard, SeverityGroup, SeveritySummary, run_alert_board};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use configuration::{LogFormat, MonitorConfig, load_config};
use core_types::{SeverityLevel, Snapshot, SystemClock};
use engine::{IngestInputs, Monitor};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The main entry point for the listing-watch application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; overrides may come from the real environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    let _log_guard = configuration::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Replay(args) => handle_replay(args, config).await,
        Commands::CheckConfig => {
            print_config(&config);
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Competitive monitoring and alert severity for marketplace listings.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to ./config.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. "info" or "engine=debug". RUST_LOG wins.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed recorded snapshots through the engine and report the result.
    Replay(ReplayArgs),
    /// Load and validate the configuration, then print the effective thresholds.
    CheckConfig,
}

#[derive(Parser)]
struct ReplayArgs {
    /// JSON array of replay records.
    #[arg(long)]
    input: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// One recorded monitoring cycle.
#[derive(Debug, Deserialize)]
struct ReplayRecord {
    item_id: String,
    snapshot: Snapshot,
    now: DateTime<Utc>,
    #[serde(default)]
    margin_pct: Option<Decimal>,
    #[serde(default)]
    best_sales_rank: Option<u32>,
}

impl ReplayRecord {
    fn inputs(&self) -> IngestInputs {
        IngestInputs {
            margin_pct: self.margin_pct,
            best_sales_rank: self.best_sales_rank,
        }
    }
}

// ==============================================================================
// Replay Command Logic
// ==============================================================================

/// Replays every item concurrently, each item's records in file order.
async fn handle_replay(args: ReplayArgs, config: MonitorConfig) -> anyhow::Result<()> {
    let records = read_records(&args.input)?;
    let by_item = split_by_item(records);
    tracing::info!(items = by_item.len(), "replaying recorded snapshots");

    let monitor = Monitor::new(config, Arc::new(SystemClock))?;
    let board = Arc::new(RwLock::new(AlertBoard::new()));
    let listener = tokio::spawn(run_alert_board(Arc::clone(&board), monitor.subscribe()));

    let tasks = by_item.iter().map(|(item_id, records)| {
        let monitor = &monitor;
        async move {
            let mut failures = 0usize;
            for record in records {
                if let Err(e) = monitor
                    .ingest_at(item_id, &record.snapshot, record.now, record.inputs())
                    .await
                {
                    tracing::error!(item_id = %item_id, now = %record.now, error = %e, "cycle rejected");
                    failures += 1;
                }
            }
            failures
        }
    });
    let failures: usize = join_all(tasks).await.into_iter().sum();

    // Dropping the monitor closes the channel so the board drains and stops.
    drop(monitor);
    listener.await.context("alert board task failed")?;

    let board = board.read().await;
    match args.format {
        OutputFormat::Json => println!("{}", board.to_json()?),
        OutputFormat::Table => {
            println!("{}", severity_table(&board.grouped()));
            println!("{}", summary_table(&board.summary()));
            for alert in board.alerts() {
                println!("[{}] {}: {}", alert.severity, alert.item_id, alert.message);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} replay record(s) were rejected");
    }
    Ok(())
}

fn read_records(path: &Path) -> anyhow::Result<Vec<ReplayRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_records(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_records(raw: &str) -> anyhow::Result<Vec<ReplayRecord>> {
    Ok(serde_json::from_str(raw)?)
}

/// Splits records per item, keeping each item's records in file order.
fn split_by_item(records: Vec<ReplayRecord>) -> BTreeMap<String, Vec<ReplayRecord>> {
    let mut by_item: BTreeMap<String, Vec<ReplayRecord>> = BTreeMap::new();
    for record in records {
        by_item.entry(record.item_id.clone()).or_default().push(record);
    }
    by_item
}

// ==============================================================================
// Output
// ==============================================================================

fn severity_color(level: SeverityLevel) -> Color {
    match level {
        SeverityLevel::Critical => Color::Red,
        SeverityLevel::High => Color::Magenta,
        SeverityLevel::Warning => Color::Yellow,
        SeverityLevel::Stable => Color::Cyan,
        SeverityLevel::Good => Color::Green,
    }
}

fn price(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |p| format!("{:.2}", p.round_dp(2)))
}

fn severity_table(groups: &[SeverityGroup<'_>]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Severity", "Item", "Event time", "Yours", "Market low", "Gap %", "Position",
        "Featured", "Trend", "Reason",
    ]);

    for group in groups {
        for item in &group.items {
            let position = item
                .your_position
                .map_or_else(|| "-".to_string(), |p| format!("{p}/{}", item.offer_count));
            let trend = item
                .trend
                .as_ref()
                .map_or_else(|| "-".to_string(), |t| t.kind.to_string());
            table.add_row(vec![
                Cell::new(item.severity).fg(severity_color(item.severity)),
                Cell::new(&item.item_id),
                Cell::new(item.event_time.format("%Y-%m-%d %H:%M")),
                Cell::new(price(item.your_price)),
                Cell::new(price(item.targets.market_low)),
                Cell::new(item.gap_percentage.round_dp(1)),
                Cell::new(position),
                Cell::new(if item.has_featured_offer { "yes" } else { "no" }),
                Cell::new(trend),
                Cell::new(item.reason.describe()),
            ]);
        }
    }
    table
}

fn summary_table(summary: &SeveritySummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Severity", "Items"]);
    for level in SeverityLevel::BY_PRIORITY {
        table.add_row(vec![
            Cell::new(level).fg(severity_color(level)),
            Cell::new(summary.count(level)),
        ]);
    }
    table.add_row(vec![Cell::new("total"), Cell::new(summary.total())]);
    table
}

fn print_config(config: &MonitorConfig) {
    let s = &config.severity;
    let rows: Vec<(&str, String)> = vec![
        ("seller_id", config.seller_id.clone()),
        ("targets.floor_ratio", config.targets.floor_ratio.to_string()),
        ("history.retention", format!("{:?}", config.history.retention)),
        ("stability.required", format!("{:?}", config.stability.required)),
        ("stability.top_positions", config.stability.top_positions.to_string()),
        ("trend.window", config.trend.window.to_string()),
        ("trend.signal_ttl", format!("{:?}", config.trend.signal_ttl)),
        ("trend.competitor_surge", config.trend.competitor_surge.to_string()),
        ("trend.position_decline", config.trend.position_decline.to_string()),
        ("trend.price_war_drop", config.trend.price_war_drop.to_string()),
        ("severity.low_priority_rank", s.low_priority_rank.to_string()),
        ("severity.critical_gap_pct", s.critical_gap_pct.to_string()),
        ("severity.extreme_gap_pct", s.extreme_gap_pct.to_string()),
        ("severity.high_gap_pct", s.high_gap_pct.to_string()),
        ("severity.warning_gap_pct", s.warning_gap_pct.to_string()),
        ("severity.min_margin_pct", s.min_margin_pct.to_string()),
        ("severity.top_tier_fraction", s.top_tier_fraction.to_string()),
        ("severity.near_miss_min_offers", s.near_miss_min_offers.to_string()),
        ("severity.crowded_min_offers", s.crowded_min_offers.to_string()),
        ("severity.top_positions", s.top_positions.to_string()),
        ("logging.level", config.logging.level.clone()),
    ];

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Setting", "Value"]);
    for (key, value) in rows {
        table.add_row(vec![key.to_string(), value]);
    }
    println!("Configuration is valid.\n{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const RECORDS: &str = r#"[
        {
            "item_id": "B2",
            "now": "2026-10-01T09:00:00Z",
            "snapshot": {
                "item_id": "B2",
                "event_time": "2026-10-01T08:59:00Z",
                "offers": [
                    { "seller_id": "ME", "listing_price": "12.00", "fulfillment": "self_fulfilled" }
                ]
            }
        },
        {
            "item_id": "A1",
            "now": "2026-10-01T09:00:00Z",
            "margin_pct": "7.5",
            "best_sales_rank": 1200,
            "snapshot": {
                "item_id": "A1",
                "event_time": "2026-10-01T08:58:00Z",
                "offers": [],
                "sales_ranks": [{ "category": "toys", "rank": 5000 }]
            }
        },
        {
            "item_id": "B2",
            "now": "2026-10-01T09:15:00Z",
            "snapshot": { "item_id": "B2", "event_time": "2026-10-01T09:14:00Z", "offers": [] }
        }
    ]"#;

    #[test]
    fn parses_records_with_optional_inputs() {
        let records = parse_records(RECORDS).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].inputs(), IngestInputs::default());
        assert_eq!(records[1].inputs().margin_pct, Some(dec!(7.5)));
        assert_eq!(records[1].inputs().best_sales_rank, Some(1200));
        assert_eq!(records[0].snapshot.offers[0].landed_price(), dec!(12.00));
    }

    #[test]
    fn split_keeps_per_item_order() {
        let by_item = split_by_item(parse_records(RECORDS).unwrap());
        let keys: Vec<_> = by_item.keys().cloned().collect();
        assert_eq!(keys, vec!["A1", "B2"]);

        let times: Vec<_> = by_item["B2"].iter().map(|r| r.now.format("%H:%M").to_string()).collect();
        assert_eq!(times, vec!["09:00", "09:15"]);
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(parse_records("{ not json").is_err());
    }
}
