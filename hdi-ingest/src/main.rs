//! hdi-ingest - Housing data import
//!
//! Clears the housing table, loads and repairs the housing, income and
//! ZIP code feeds, stores every identifier present in all three, then
//! answers the two validation queries (bedroom total above a room count,
//! average income for a ZIP code).
//!
//! Progress and results go to stdout; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::Parser;
use hdi_common::config::{ImportPaths, PathOverrides, TomlConfig};
use hdi_ingest::fields::SourceKind;
use hdi_ingest::query::{bedrooms_report, income_report, QueryStage};
use hdi_ingest::repair::FieldRepairer;
use hdi_ingest::{run_import, SourceRows, SqliteRecordStore};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for hdi-ingest
#[derive(Parser, Debug)]
#[command(name = "hdi-ingest")]
#[command(about = "Clean, merge and load housing, income and ZIP code data")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/hdi/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database receiving the housing table
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Housing attributes CSV
    #[arg(long)]
    housing: Option<PathBuf>,

    /// Income attributes CSV
    #[arg(long)]
    income: Option<PathBuf>,

    /// ZIP code / geography CSV
    #[arg(long)]
    zip: Option<PathBuf>,

    /// Room threshold for the bedroom query (prompted if absent)
    #[arg(long)]
    rooms: Option<i64>,

    /// ZIP code for the income query (prompted if absent)
    #[arg(long)]
    zip_code: Option<i64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .with_writer(io::stderr)
        .init();

    info!(
        "Starting hdi-ingest v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let overrides = PathOverrides {
        database: args.database,
        housing_file: args.housing,
        income_file: args.income,
        zip_file: args.zip,
    };
    let paths = ImportPaths::resolve(&overrides, &toml_config);
    info!("Database path: {}", paths.database.display());

    let pool = hdi_common::db::init_database(&paths.database)
        .await
        .context("Failed to open database")?;
    let store = SqliteRecordStore::new(pool);

    let rows = SourceRows::read(&paths).context("Failed to read source feeds")?;

    println!("Beginning import");
    let mut repairer = FieldRepairer::from_entropy();
    let summary = run_import(&store, rows, &mut repairer)
        .await
        .context("Import failed")?;

    for kind in [SourceKind::Housing, SourceKind::Income, SourceKind::Geography] {
        println!("Cleaning {} File data", kind);
        println!(
            "{} records imported into the database",
            summary.counts(kind).retained
        );
    }
    println!("Import completed");
    info!(
        persisted = summary.merge.persisted,
        failed = summary.merge.failed,
        unmatched = summary.merge.unmatched,
        "Merged entries stored"
    );

    println!("Beginning validation");
    let queries = QueryStage::new(&store);

    let rooms = match args.rooms {
        Some(rooms) => rooms,
        None => prompt_integer("Total Rooms: ")?,
    };
    let total_bedrooms = queries.total_bedrooms_above(rooms).await?;
    println!("{}", bedrooms_report(rooms, total_bedrooms));

    let zip_code = match args.zip_code {
        Some(zip_code) => zip_code,
        None => prompt_integer("ZIP Code: ")?,
    };
    let average_income = queries.average_income_for_zip(zip_code).await?;
    println!("{}", income_report(zip_code, average_income));

    println!("Program exiting.");
    store.pool().close().await;

    Ok(())
}

/// Prompt on stdout until stdin yields an integer
fn prompt_integer(label: &str) -> Result<i64> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{}", label);
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            bail!("Input closed while waiting for '{}'", label.trim_end_matches(": "));
        }

        match line.trim().parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("Please enter a whole number."),
        }
    }
}
