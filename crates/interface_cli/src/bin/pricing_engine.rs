//! Pricing Engine - command line binary
//!
//! Prices an invoice request against a reference data snapshot and prints
//! the result as JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! pricing-engine --snapshot demos/snapshot.json --request demos/invoice_request.json --pretty
//!
//! # Price as of a fixed date, logging at debug level as JSON
//! PRICING__LOG_LEVEL=debug PRICING__LOG_JSON=true pricing-engine \
//!     --snapshot demos/snapshot.json --request demos/invoice_request.json --as-of 2024-06-15
//! ```
//!
//! # Environment Variables
//!
//! * `PRICING__SNAPSHOT_PATH` - Snapshot used when `--snapshot` is omitted
//! * `PRICING__LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `PRICING__LOG_JSON` - Emit logs as JSON lines (default: false)
//! * `PRICING__PRICING__DECIMAL_PLACES` - Money precision (default: 2)
//! * `PRICING__PRICING__WEEK_START` - First day of a calendar week (default: Mon)
//! * `PRICING__PRICING__DEFAULT_RESTRICTION_PERIOD` - Period for limits stored without one (default: yearly)

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_store::InMemoryStore;
use interface_cli::{price_invoice, CliConfig, CliError, InvoiceRequest};

/// Price an invoice for one employee
#[derive(Debug, Parser)]
#[command(name = "pricing-engine", version, about)]
struct Args {
    /// Reference data snapshot (JSON)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Invoice request (JSON)
    #[arg(long)]
    request: PathBuf,

    /// Pricing date, overriding the request's `as_of`
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            let code = err
                .downcast_ref::<CliError>()
                .map(CliError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = CliConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config.log_level, config.log_json);

    let snapshot_path = args
        .snapshot
        .or_else(|| config.snapshot_path.clone())
        .context("No snapshot given: pass --snapshot or set PRICING__SNAPSHOT_PATH")?;

    tracing::info!(snapshot = %snapshot_path.display(), request = %args.request.display(), "Starting pricing run");

    let store = InMemoryStore::from_path(&snapshot_path)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?;
    let request = InvoiceRequest::from_path(&args.request)?;

    let as_of = args
        .as_of
        .or(request.as_of)
        .unwrap_or_else(|| Local::now().date_naive());

    let response = price_invoice(&store, config.pricing.clone(), &request, as_of)?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    }
    .context("Failed to serialize result")?;
    println!("{}", output);
    Ok(())
}

/// Initializes the tracing subscriber on stderr.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
