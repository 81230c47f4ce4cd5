//! # Offline Dashboard Report
//!
//! Computes the dashboard from snapshot files and prints it as JSON.
//!
//! ## Usage
//! ```bash
//! # Paths from stockroom.toml [report] / STOCKROOM_*_PATH
//! cargo run -p stockroom-feed --bin stockroom-report
//!
//! # Explicit snapshot files
//! cargo run -p stockroom-feed --bin stockroom-report -- \
//!     --items inventory.json --orders orders.json --period week
//!
//! # Verbose logs (stderr)
//! RUST_LOG=stockroom=trace cargo run -p stockroom-feed --bin stockroom-report
//! ```
//!
//! Each snapshot file is a JSON array of documents, as exported from the
//! collection. When a movements file is given, its movements are applied to
//! the item stock levels before anything is computed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Subscriber};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use stockroom_core::sales::{ReportPeriod, SalesReport};
use stockroom_core::{ActivityEvent, DerivedStatistics};
use stockroom_feed::ingest;
use stockroom_feed::{
    DashboardView, FeedConfig, FeedError, FeedResult, MemoryLedger, MovementApplier,
};

/// Log directives used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "info,stockroom=debug";

/// The printed document.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    store: String,
    generated_at: DateTime<Utc>,
    statistics: DerivedStatistics,
    sales: SalesReport,
    recent_activity: Vec<ActivityEvent>,
}

#[derive(Default)]
struct Args {
    config: Option<PathBuf>,
    items: Option<PathBuf>,
    orders: Option<PathBuf>,
    activity: Option<PathBuf>,
    movements: Option<PathBuf>,
    period: Option<String>,
    help: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1).cloned();
        let mut takes_value = true;
        match args[i].as_str() {
            "--config" | "-c" => parsed.config = value.map(PathBuf::from),
            "--items" | "-i" => parsed.items = value.map(PathBuf::from),
            "--orders" | "-o" => parsed.orders = value.map(PathBuf::from),
            "--activity" | "-a" => parsed.activity = value.map(PathBuf::from),
            "--movements" | "-m" => parsed.movements = value.map(PathBuf::from),
            "--period" | "-p" => parsed.period = value,
            "--help" | "-h" => {
                parsed.help = true;
                takes_value = false;
            }
            other => {
                warn!(argument = %other, "Ignoring unknown argument");
                takes_value = false;
            }
        }
        i += if takes_value { 2 } else { 1 };
    }
    parsed
}

fn print_help() {
    println!("Stockroom Dashboard Report");
    println!();
    println!("Usage: stockroom-report [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>     Config file (default: platform config dir)");
    println!("  -i, --items <PATH>      Inventory snapshot (JSON array)");
    println!("  -o, --orders <PATH>     Orders snapshot (JSON array)");
    println!("  -a, --activity <PATH>   Activity snapshot (JSON array)");
    println!("  -m, --movements <PATH>  Stock movements to apply first");
    println!("  -p, --period <PERIOD>   Sales period: all, today, week, month");
    println!("  -h, --help              Show this help message");
}

// =============================================================================
// Logging
// =============================================================================

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Logs go to stderr so stdout carries only the report.
fn log_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

fn init_tracing() {
    let directives = env::var(EnvFilter::DEFAULT_ENV).ok();
    log_subscriber(log_filter(directives.as_deref())).init();
}

// =============================================================================
// Report
// =============================================================================

/// Reads a snapshot file; a missing path is an empty collection.
fn read_snapshot(kind: &str, path: Option<&Path>) -> FeedResult<Vec<Value>> {
    let Some(path) = path else {
        warn!(collection = kind, "No snapshot file given, treating as empty");
        return Ok(Vec::new());
    };

    let contents = std::fs::read_to_string(path).map_err(|e| {
        FeedError::DeserializationFailed(format!("cannot read {}: {}", path.display(), e))
    })?;
    match serde_json::from_str::<Value>(&contents)? {
        Value::Array(docs) => {
            info!(collection = kind, ?path, documents = docs.len(), "Loaded snapshot");
            Ok(docs)
        }
        _ => Err(FeedError::malformed(
            kind,
            format!("{} is not a JSON array", path.display()),
        )),
    }
}

/// Layers the command-line options over the loaded config.
fn apply_args(config: &mut FeedConfig, args: Args) -> FeedResult<()> {
    let report = &mut config.report;
    report.items_path = args.items.or(report.items_path.take());
    report.orders_path = args.orders.or(report.orders_path.take());
    report.activity_path = args.activity.or(report.activity_path.take());
    report.movements_path = args.movements.or(report.movements_path.take());
    if let Some(period) = args.period {
        config.dashboard.report_period = period.parse::<ReportPeriod>()?;
    }

    if config.report.items_path.is_none() && config.report.orders_path.is_none() {
        return Err(FeedError::InvalidConfig(
            "no inventory or orders snapshot given (see --help)".into(),
        ));
    }
    Ok(())
}

/// Ingests the configured snapshot files, applies any stock movements to
/// the items, then computes the dashboard.
async fn build_report(config: &FeedConfig, now: DateTime<Utc>) -> FeedResult<Report> {
    let paths = &config.report;
    let names = &config.collections;

    let mut items = ingest::ingest_item_collection(&read_snapshot(
        &names.inventory,
        paths.items_path.as_deref(),
    )?);
    let orders = ingest::ingest_order_collection(&read_snapshot(
        &names.orders,
        paths.orders_path.as_deref(),
    )?);
    let activity = ingest::ingest_activity_collection(&read_snapshot(
        &names.activity,
        paths.activity_path.as_deref(),
    )?);

    if paths.movements_path.is_some() {
        let movements = ingest::ingest_movement_collection(&read_snapshot(
            &names.stock_movements,
            paths.movements_path.as_deref(),
        )?);
        let applier = MovementApplier::new(MemoryLedger::from_items(&items));
        applier.apply(&movements, &items).await;
        applier.ledger().apply_to(&mut items).await;
    }

    let view = DashboardView::compute(&items, &orders, &activity, &config.dashboard, now);
    info!(
        store = %config.store_id(),
        period = %config.dashboard.report_period,
        total_value = %view.statistics.total_value,
        "Report computed"
    );

    Ok(Report {
        store: config.store_id().to_string(),
        generated_at: now,
        statistics: view.statistics,
        sales: view.sales,
        recent_activity: view.recent_activity,
    })
}

async fn run(args: Args) -> FeedResult<()> {
    let mut config = FeedConfig::load(args.config.clone())?;
    apply_args(&mut config, args)?;

    let report = build_report(&config, Utc::now()).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = parse_args();
    if args.help {
        print_help();
        return Ok(());
    }

    run(args).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stockroom_core::Money;
    use tracing::Level;

    fn write_snapshot(name: &str, docs: Value) -> PathBuf {
        let path = env::temp_dir().join(format!("stockroom-{}-{}", uuid::Uuid::new_v4(), name));
        std::fs::write(&path, docs.to_string()).unwrap();
        path
    }

    fn items_snapshot() -> PathBuf {
        write_snapshot(
            "inventory.json",
            json!([
                {"id": "inv-1", "productCode": "TILE-30", "price": 10, "currentStock": 5},
                {"id": "inv-2", "productCode": "GROUT-5", "price": 100, "currentStock": 0}
            ]),
        )
    }

    #[test]
    fn test_log_filter_honours_directives() {
        let quiet = log_subscriber(log_filter(Some("error")));
        tracing::subscriber::with_default(quiet, || {
            assert!(tracing::enabled!(Level::ERROR));
            assert!(!tracing::enabled!(Level::INFO));
            assert!(!tracing::enabled!(target: "stockroom_feed::config", Level::DEBUG));
        });

        let default = log_subscriber(log_filter(None));
        tracing::subscriber::with_default(default, || {
            assert!(tracing::enabled!(target: "stockroom_feed::config", Level::DEBUG));
            assert!(!tracing::enabled!(target: "stockroom_feed::config", Level::TRACE));
            assert!(!tracing::enabled!(target: "other_crate", Level::DEBUG));
        });
    }

    #[test]
    fn test_unparsable_directives_fall_back() {
        let filter = log_subscriber(log_filter(Some("stockroom=loud")));
        tracing::subscriber::with_default(filter, || {
            assert!(tracing::enabled!(target: "stockroom_report", Level::DEBUG));
        });
    }

    #[test]
    fn test_args_override_config_paths() {
        let mut config = FeedConfig::default();
        config.report.items_path = Some(PathBuf::from("from-config/items.json"));
        config.report.orders_path = Some(PathBuf::from("from-config/orders.json"));

        let args = Args {
            items: Some(PathBuf::from("cli/items.json")),
            period: Some("week".into()),
            ..Default::default()
        };
        apply_args(&mut config, args).unwrap();

        assert_eq!(config.report.items_path, Some(PathBuf::from("cli/items.json")));
        assert_eq!(config.report.orders_path, Some(PathBuf::from("from-config/orders.json")));
        assert_eq!(config.dashboard.report_period, ReportPeriod::Week);
    }

    #[test]
    fn test_args_require_a_snapshot() {
        let mut config = FeedConfig::default();
        let result = apply_args(&mut config, Args::default());
        assert!(matches!(result, Err(FeedError::InvalidConfig(_))));

        let args = Args {
            orders: Some(PathBuf::from("orders.json")),
            period: Some("fortnight".into()),
            ..Default::default()
        };
        assert!(apply_args(&mut config, args).is_err());
    }

    #[tokio::test]
    async fn test_report_without_movements() {
        let mut config = FeedConfig::default();
        config.report.items_path = Some(items_snapshot());

        let report = build_report(&config, Utc::now()).await.unwrap();
        assert_eq!(report.statistics.total_value, Money::from_pesos(50));
        assert_eq!(report.statistics.out_of_stock, 1);
        assert_eq!(report.store, config.store_id());
    }

    #[tokio::test]
    async fn test_movements_apply_before_compute() {
        let mut config = FeedConfig::default();
        config.report.items_path = Some(items_snapshot());
        config.report.movements_path = Some(write_snapshot(
            "movements.json",
            json!([
                {"itemId": "inv-1", "type": "out", "quantity": 2},
                {"productCode": "GROUT-5", "type": "in", "quantity": 3},
                {"productCode": "MISSING", "type": "in", "quantity": 9}
            ]),
        ));

        let report = build_report(&config, Utc::now()).await.unwrap();
        // 10 × 3 + 100 × 3
        assert_eq!(report.statistics.total_value, Money::from_pesos(330));
        assert_eq!(report.statistics.out_of_stock, 0);
    }

    #[tokio::test]
    async fn test_non_array_snapshot_is_malformed() {
        let mut config = FeedConfig::default();
        config.report.items_path = Some(write_snapshot("inventory.json", json!({"id": "inv-1"})));

        let result = build_report(&config, Utc::now()).await;
        assert!(matches!(result, Err(FeedError::MalformedDocument { .. })));
    }

    #[tokio::test]
    async fn test_missing_snapshot_file() {
        let mut config = FeedConfig::default();
        config.report.items_path = Some(env::temp_dir().join("stockroom-does-not-exist.json"));

        let result = build_report(&config, Utc::now()).await;
        assert!(matches!(result, Err(FeedError::DeserializationFailed(_))));
    }
}
