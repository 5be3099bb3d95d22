//! ora-sched library - daily loader scheduling
//!
//! Runs the loader binary as a child process once a day at a fixed local
//! time. A failed run is logged and the schedule carries on.

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use ora_common::config::{
    AppConfig, ENV_BATCH_SIZE, ENV_COLLECTION_NAME, ENV_DATABASE_NAME, ENV_DATA_DIR,
    ENV_LOG_LEVEL, ENV_MONGODB_URI,
};
use ora_common::{Error, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Instant;
use tokio::process::Command;
use tracing::{error, info, warn};

/// Name of the loader binary looked up next to `ora-sched`
pub const LOADER_BINARY: &str = "ora-etl";

/// The next moment at `at`: later today if still ahead, otherwise tomorrow
///
/// A `now` exactly at `at` schedules for tomorrow, so a run that finishes
/// within the same minute is not repeated.
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Program and arguments used to run the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LoaderCommand {
    /// Split a configured command line on whitespace
    pub fn parse(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::Config("loader command is empty".to_string()))?;

        Ok(Self {
            program: PathBuf::from(program),
            args: parts.map(str::to_string).collect(),
        })
    }

    /// Configured command, else `ora-etl` beside `current_exe`, else `ora-etl` on PATH
    pub fn resolve(configured: Option<&str>, current_exe: Option<&Path>) -> Result<Self> {
        if let Some(command_line) = configured {
            return Self::parse(command_line);
        }

        let file_name = format!("{}{}", LOADER_BINARY, std::env::consts::EXE_SUFFIX);
        let sibling = current_exe
            .and_then(Path::parent)
            .map(|dir| dir.join(&file_name))
            .filter(|path| path.is_file());

        Ok(Self {
            program: sibling.unwrap_or_else(|| PathBuf::from(file_name)),
            args: Vec::new(),
        })
    }

    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Settings the loader child inherits from the scheduler's resolved config
///
/// The child resolves its own configuration, where environment variables
/// outrank TOML and defaults, so CLI flags and `--config` values given to
/// `ora-sched` reach the loader this way.
pub fn loader_environment(config: &AppConfig) -> Vec<(&'static str, String)> {
    vec![
        (ENV_MONGODB_URI, config.mongodb_uri.clone()),
        (ENV_DATABASE_NAME, config.database_name.clone()),
        (ENV_COLLECTION_NAME, config.collection_name.clone()),
        (ENV_DATA_DIR, config.data_dir.display().to_string()),
        (ENV_BATCH_SIZE, config.batch_size.to_string()),
        (ENV_LOG_LEVEL, config.log_level.clone()),
    ]
}

/// Runs the loader at a fixed time every day
pub struct Scheduler {
    at: NaiveTime,
    command: LoaderCommand,
    env: Vec<(&'static str, String)>,
}

impl Scheduler {
    pub fn new(at: NaiveTime, command: LoaderCommand) -> Self {
        Self {
            at,
            command,
            env: Vec::new(),
        }
    }

    /// Extra environment for every loader run
    pub fn with_env(mut self, env: Vec<(&'static str, String)>) -> Self {
        self.env = env;
        self
    }

    /// Run the loader once and wait for it
    ///
    /// The child inherits stdout/stderr so its progress log lands in the
    /// scheduler's output.
    pub async fn run_once(&self) -> Result<ExitStatus> {
        let started_at = Local::now();
        let started = Instant::now();
        info!(
            "{} - Running loader: {}",
            started_at.format("%Y-%m-%d %H:%M:%S"),
            self.command.display()
        );

        let status = Command::new(&self.command.program)
            .args(&self.command.args)
            .envs(self.env.iter().map(|(k, v)| (*k, v.as_str())))
            .kill_on_drop(true)
            .status()
            .await?;

        let elapsed = started.elapsed().as_secs_f64();
        if status.success() {
            info!(elapsed_secs = elapsed, "Loader finished: {}", status);
        } else {
            warn!(elapsed_secs = elapsed, "Loader exited unsuccessfully: {}", status);
        }
        Ok(status)
    }

    /// Sleep until each scheduled time and run the loader, until `shutdown` resolves
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let now = Local::now().naive_local();
            let next = next_run_after(now, self.at);
            let wait = (next - now).to_std().unwrap_or_default();
            info!(
                "Next loader run at {} (in {}h {:02}m)",
                next.format("%Y-%m-%d %H:%M"),
                wait.as_secs() / 3600,
                (wait.as_secs() % 3600) / 60
            );

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler stopped");
                    return;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            // A shutdown during a run stops the loop once the child has been dropped
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler stopped during a loader run");
                    return;
                }
                result = self.run_once() => {
                    if let Err(e) = result {
                        error!("Loader could not be started: {}", e);
                    }
                }
            }
        }
    }
}

/// Initialize the tracing subscriber for ora-sched
///
/// `RUST_LOG` wins; otherwise `default_level` from configuration applies.
pub fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}
