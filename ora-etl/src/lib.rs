//! ora-etl library - CSV loading and collection maintenance
//!
//! - `sources`: per-source CSV row types and normalization into `Record`s
//! - `loader`: batched, unordered inserts with progress reporting
//! - `indexes`: the fixed index catalogue for the records collection
//! - `cleanup`: interactive collection drop
//! - `report`: console summaries printed by the binaries

pub mod cleanup;
pub mod dates;
pub mod indexes;
pub mod loader;
pub mod report;
pub mod sources;

pub use loader::{EtlSummary, Loader, SourceReport};

/// Initialize the tracing subscriber shared by the ora-etl binaries
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
