//! ora-indexes - create the index catalogue on the records collection
//!
//! Safe to rerun: creating an index that already exists with the same
//! definition is a no-op on the server.

use anyhow::{Context, Result};
use clap::Parser;
use ora_common::cli::DatabaseArgs;
use ora_common::config::{load_dotenv, ConfigResolver};
use ora_common::db::{MongoStore, RecordStore};
use ora_etl::{indexes, init_tracing, report};
use tracing::{info, warn};

/// Index manager for the records collection
#[derive(Parser, Debug)]
#[command(name = "ora-indexes")]
#[command(about = "Create the indexes used by the ORA aggregation queries")]
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

    info!(
        "{}",
        ora_common::build_info!().banner("ORA index manager", "ora-indexes")
    );

    let store = MongoStore::connect(&config)
        .await
        .context("Failed to connect to MongoDB")?;
    info!("Creating indexes on {}", store.namespace());

    let outcome = indexes::ensure_indexes(&store).await;

    let names = store
        .list_index_names()
        .await
        .context("Failed to list indexes")?;

    let stats = match store.stats().await {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!("Could not read collection stats: {}", e);
            None
        }
    };

    println!("{}", report::render_index_report(&outcome, &names, stats.as_ref()));

    store.shutdown().await;

    if outcome.is_complete() {
        info!("Done");
        Ok(())
    } else {
        anyhow::bail!("{} index(es) could not be created", outcome.failed.len())
    }
}
