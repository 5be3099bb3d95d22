//! ora-etl - CSV loader
//!
//! Loads the three CSV sources (Online Retail, Sales Data, Customers) from
//! the data directory into the records collection, then prints a per-source
//! summary and collection statistics.

use anyhow::{Context, Result};
use clap::Parser;
use ora_common::cli::DatabaseArgs;
use ora_common::config::{load_dotenv, ConfigResolver};
use ora_common::db::{MongoStore, RecordStore};
use ora_common::SourceId;
use ora_etl::{indexes, init_tracing, report, EtlSummary, Loader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Command-line arguments for ora-etl
#[derive(Parser, Debug)]
#[command(name = "ora-etl")]
#[command(about = "Load the retail CSV sources into MongoDB")]
#[command(version)]
struct Args {
    #[command(flatten)]
    db: DatabaseArgs,

    /// Directory containing online_retail.csv, sales_data.csv and customers.csv
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Documents per insert_many call
    #[arg(long)]
    batch_size: Option<usize>,

    /// Load only this source (source1, source2 or source3)
    #[arg(long, value_name = "SOURCE")]
    source: Option<SourceId>,

    /// Create the index catalogue after loading
    #[arg(long)]
    ensure_indexes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_path = load_dotenv();
    let args = Args::parse();

    let mut overrides = args.db.overrides();
    overrides.data_dir = args.data_dir.clone();
    overrides.batch_size = args.batch_size;
    let config = ConfigResolver::new(overrides)
        .resolve()
        .context("Failed to resolve configuration")?;

    init_tracing(&config.log_level);

    info!("{}", ora_common::build_info!().banner("ORA loader", "ora-etl"));
    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }
    info!("Database: {}", config.redacted_uri());
    info!("Data directory: {}", config.data_dir.display());

    let store = MongoStore::connect(&config)
        .await
        .context("Failed to connect to MongoDB")?;
    info!("Connected to {}", store.namespace());
    let store_handle: Arc<dyn RecordStore> = Arc::new(store.clone());

    let loader = Loader::new(store_handle.clone(), config.batch_size);
    let summary = match args.source {
        Some(source) => {
            let started = Instant::now();
            let path = Loader::source_path(&config.data_dir, source);
            let report = loader.load_source(source, &path).await;
            EtlSummary {
                sources: vec![report],
                elapsed: started.elapsed(),
            }
        }
        None => loader.run(&config.data_dir).await,
    };

    if args.ensure_indexes {
        let index_report = indexes::ensure_indexes(store_handle.as_ref()).await;
        if !index_report.is_complete() {
            warn!("{} index(es) could not be created", index_report.failed.len());
        }
    }

    let stats = match store_handle.stats().await {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!("Could not read collection stats: {}", e);
            None
        }
    };

    println!("{}", report::render_etl_summary(&summary, stats.as_ref()));

    drop(loader);
    drop(store_handle);
    store.shutdown().await;

    info!("ETL completed");
    Ok(())
}
