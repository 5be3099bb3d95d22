//! Batch loader: CSV file → normalized records → unordered inserts
//!
//! Each source is streamed row by row and flushed to the store every
//! `batch_size` documents. Loading is best-effort: a skipped row or a failed
//! batch is counted and logged, and the load carries on. The three sources
//! are loaded one after another with no cross-source transaction.

use bson::Document;
use chrono::Utc;
use ora_common::db::RecordStore;
use ora_common::format::rate_per_sec;
use ora_common::SourceId;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::sources::{Source1Row, Source2Row, Source3Row, SourceRow};

/// Outcome of loading one source file
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: SourceId,
    pub path: PathBuf,
    pub file_found: bool,
    /// Data rows read from the file (header excluded)
    pub rows_read: u64,
    /// Rows that could not be decoded or normalized
    pub rows_skipped: u64,
    pub inserted: u64,
    /// Documents rejected by the server or lost with a failed batch
    pub failed: u64,
    pub batches: u64,
    pub batches_failed: u64,
    pub elapsed: Duration,
}

impl SourceReport {
    fn new(source: SourceId, path: &Path) -> Self {
        Self {
            source,
            path: path.to_path_buf(),
            file_found: false,
            rows_read: 0,
            rows_skipped: 0,
            inserted: 0,
            failed: 0,
            batches: 0,
            batches_failed: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Outcome of a full three-source run
#[derive(Debug, Clone)]
pub struct EtlSummary {
    pub sources: Vec<SourceReport>,
    pub elapsed: Duration,
}

impl EtlSummary {
    pub fn total_inserted(&self) -> u64 {
        self.sources.iter().map(|s| s.inserted).sum()
    }

    pub fn docs_per_sec(&self) -> f64 {
        rate_per_sec(self.total_inserted(), self.elapsed.as_secs_f64())
    }

    pub fn report_for(&self, source: SourceId) -> Option<&SourceReport> {
        self.sources.iter().find(|s| s.source == source)
    }
}

/// Loads CSV sources into a [`RecordStore`]
pub struct Loader {
    store: Arc<dyn RecordStore>,
    batch_size: usize,
}

impl Loader {
    pub fn new(store: Arc<dyn RecordStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Path of a source's CSV inside `data_dir`
    pub fn source_path(data_dir: &Path, source: SourceId) -> PathBuf {
        data_dir.join(source.default_file())
    }

    /// Load all three sources from `data_dir`, in order
    pub async fn run(&self, data_dir: &Path) -> EtlSummary {
        let started = Instant::now();
        let mut sources = Vec::with_capacity(SourceId::ALL.len());

        for source in SourceId::ALL {
            let path = Self::source_path(data_dir, source);
            sources.push(self.load_source(source, &path).await);
        }

        EtlSummary {
            sources,
            elapsed: started.elapsed(),
        }
    }

    /// Load one source file. Never fails: problems are logged and reflected
    /// in the returned report.
    pub async fn load_source(&self, source: SourceId, path: &Path) -> SourceReport {
        info!(
            source = %source,
            path = %path.display(),
            "Loading {} ({})",
            source.display_name(),
            source.description()
        );

        let report = match source {
            SourceId::Source1 => self.load_rows::<Source1Row>(path).await,
            SourceId::Source2 => self.load_rows::<Source2Row>(path).await,
            SourceId::Source3 => self.load_rows::<Source3Row>(path).await,
        };

        info!(
            source = %source,
            inserted = report.inserted,
            skipped = report.rows_skipped,
            failed = report.failed,
            elapsed_secs = report.elapsed.as_secs_f64(),
            "{} completed",
            source.display_name()
        );

        report
    }

    async fn load_rows<R: SourceRow>(&self, path: &Path) -> SourceReport {
        let started = Instant::now();
        let mut report = SourceReport::new(R::SOURCE, path);

        if !path.exists() {
            error!(source = %R::SOURCE, "File not found: {}", path.display());
            return report;
        }
        report.file_found = true;

        let mut reader = match csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_path(path)
        {
            Ok(reader) => reader,
            Err(e) => {
                error!(source = %R::SOURCE, "Error reading CSV {}: {}", path.display(), e);
                report.elapsed = started.elapsed();
                return report;
            }
        };

        // One load timestamp per source run
        let now = Utc::now();
        let mut batch: Vec<Document> = Vec::with_capacity(self.batch_size);

        for (index, result) in reader.deserialize::<R>().enumerate() {
            report.rows_read += 1;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    report.rows_skipped += 1;
                    debug!(source = %R::SOURCE, row = index, "Skipping undecodable row: {}", e);
                    continue;
                }
            };

            let doc = match row.normalize(index as u64, now) {
                Ok(record) => match record.to_document() {
                    Ok(doc) => doc,
                    Err(e) => {
                        report.rows_skipped += 1;
                        warn!(source = %R::SOURCE, row = index, "Skipping unencodable row: {}", e);
                        continue;
                    }
                },
                Err(e) => {
                    report.rows_skipped += 1;
                    debug!(source = %R::SOURCE, row = index, "Skipping row: {}", e);
                    continue;
                }
            };

            batch.push(doc);
            if batch.len() >= self.batch_size {
                self.flush(&mut batch, &mut report, started).await;
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, &mut report, started).await;
        }

        if report.rows_skipped > 0 {
            warn!(
                source = %R::SOURCE,
                skipped = report.rows_skipped,
                "Some rows were skipped (undecodable or missing a usable date)"
            );
        }

        report.elapsed = started.elapsed();
        report
    }

    /// Insert the pending batch and update the running report
    async fn flush(&self, batch: &mut Vec<Document>, report: &mut SourceReport, started: Instant) {
        let docs = std::mem::replace(batch, Vec::with_capacity(self.batch_size));
        let size = docs.len() as u64;
        report.batches += 1;

        match self.store.insert_many(docs).await {
            Ok(outcome) => {
                report.inserted += outcome.inserted;
                report.failed += outcome.failed;
                let rate = rate_per_sec(report.inserted, started.elapsed().as_secs_f64());
                info!(
                    source = %report.source,
                    batch = report.batches,
                    docs = size,
                    total = report.inserted,
                    "Batch {}: {} docs | Total: {} | Rate: {:.0} docs/sec",
                    report.batches,
                    size,
                    report.inserted,
                    rate
                );
            }
            Err(e) => {
                report.batches_failed += 1;
                report.failed += size;
                error!(
                    source = %report.source,
                    batch = report.batches,
                    docs = size,
                    "Error in batch {}: {}",
                    report.batches,
                    e
                );
            }
        }
    }
}
