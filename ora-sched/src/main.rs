//! ora-sched - run the loader once a day
//!
//! Sleeps until `SCHEDULE_TIME` (local time, default 02:00), runs the loader
//! as a child process and repeats. Ctrl+C or SIGTERM stops it.

use anyhow::{Context, Result};
use clap::Parser;
use ora_common::cli::DatabaseArgs;
use ora_common::config::{load_dotenv, ConfigResolver};
use ora_sched::{init_tracing, loader_environment, LoaderCommand, Scheduler};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for ora-sched
#[derive(Parser, Debug)]
#[command(name = "ora-sched")]
#[command(about = "Run the ORA loader daily at a fixed time")]
#[command(version)]
struct Args {
    #[command(flatten)]
    db: DatabaseArgs,

    /// Daily run time as HH:MM, local time (overrides SCHEDULE_TIME)
    #[arg(long, value_name = "HH:MM")]
    at: Option<String>,

    /// Loader command line (overrides ORA_LOADER_COMMAND)
    #[arg(long, value_name = "COMMAND")]
    loader: Option<String>,

    /// Run the loader once immediately before waiting for the schedule
    #[arg(long)]
    run_now: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let args = Args::parse();

    let mut overrides = args.db.overrides();
    overrides.schedule_time = args.at.clone();
    overrides.loader_command = args.loader.clone();
    let config = ConfigResolver::new(overrides)
        .resolve()
        .context("Failed to resolve configuration")?;

    init_tracing(&config.log_level);

    info!("{}", ora_common::build_info!().banner("ORA scheduler", "ora-sched"));

    let at = config.schedule_time()?;
    let current_exe = std::env::current_exe().ok();
    let command = LoaderCommand::resolve(config.loader_command.as_deref(), current_exe.as_deref())?;

    info!("Scheduler started");
    info!("  Loader will run daily at {}", at.format("%H:%M"));
    info!("  Command: {}", command.display());
    info!("  Target: {} ({}.{})", config.redacted_uri(), config.database_name, config.collection_name);
    info!("  (Press Ctrl+C to stop)");

    let scheduler = Scheduler::new(at, command).with_env(loader_environment(&config));

    if args.run_now {
        if let Err(e) = scheduler.run_once().await {
            error!("Loader could not be started: {}", e);
        }
    }

    scheduler.run_until(shutdown_signal()).await;
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping scheduler");
        },
        _ = terminate => {
            info!("Received terminate signal, stopping scheduler");
        },
    }
}
