//! ora-cleanup - interactive drop of the records collection

use anyhow::{Context, Result};
use clap::Parser;
use ora_common::cli::DatabaseArgs;
use ora_common::config::{load_dotenv, ConfigResolver};
use ora_common::db::MongoStore;
use ora_etl::cleanup::{run_cleanup, CleanupOutcome};
use ora_etl::init_tracing;
use tracing::info;

/// Drop the records collection before a full reload
#[derive(Parser, Debug)]
#[command(name = "ora-cleanup")]
#[command(about = "Drop the records collection (asks for confirmation)")]
#[command(version)]
struct Args {
    #[command(flatten)]
    db: DatabaseArgs,

    /// Drop without asking
    #[arg(long)]
    yes: bool,
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

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    let outcome = run_cleanup(&store, args.yes, &mut input, &mut output)
        .await
        .context("Cleanup failed")?;

    match outcome {
        CleanupOutcome::Dropped { documents } => info!(documents, "Cleanup finished"),
        CleanupOutcome::Cancelled { .. } => info!("Cleanup cancelled by operator"),
    }

    store.shutdown().await;
    Ok(())
}
