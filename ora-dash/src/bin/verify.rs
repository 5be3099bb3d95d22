//! ora-verify - check that all sources were loaded and print summary figures

use anyhow::{Context, Result};
use clap::Parser;
use ora_common::cli::DatabaseArgs;
use ora_common::config::{load_dotenv, ConfigResolver};
use ora_common::db::{MongoStore, RecordStore};
use ora_dash::{init_tracing, verify, Aggregations};
use std::sync::Arc;
use tracing::{info, warn};

/// Data verification report
#[derive(Parser, Debug)]
#[command(name = "ora-verify")]
#[command(about = "Verify the loaded records and print summary statistics")]
#[command(version)]
struct Args {
    #[command(flatten)]
    db: DatabaseArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let args = Args::parse();

    let config = ConfigResolver::new(args.db.overrides())
        .resolve()
        .context("Failed to resolve configuration")?;
    init_tracing(&config.log_level);

    let store = MongoStore::connect(&config)
        .await
        .context("Failed to connect to MongoDB")?;
    info!("Verifying {}", store.namespace());

    let store_handle: Arc<dyn RecordStore> = Arc::new(store.clone());
    let aggregations = Aggregations::new(store_handle);
    let report = verify::collect(&aggregations)
        .await
        .context("Verification queries failed")?;

    println!("{}", verify::render(&report));

    let missing = report.missing_sources();
    if !missing.is_empty() {
        warn!("{} source(s) have no documents", missing.len());
    }

    drop(aggregations);
    store.shutdown().await;
    Ok(())
}
