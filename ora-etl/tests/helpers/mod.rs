//! In-memory RecordStore used by the ora-etl integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bson::Document;
use ora_common::db::{CollectionStats, IndexSpec, InsertReport, RecordStore};
use ora_common::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeStore {
    /// Every accepted batch, in insert order
    pub batches: Mutex<Vec<Vec<Document>>>,
    /// 1-based insert call numbers that return an error
    pub failing_batches: Vec<usize>,
    /// Documents per batch the server "rejects" (reported, not an error)
    pub rejected_per_batch: u64,
    /// Index names whose creation fails
    pub failing_indexes: Vec<String>,
    pub indexes: Mutex<Vec<String>>,
    pub dropped: Mutex<bool>,
    pub calls: Mutex<usize>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(batches: &[usize]) -> Self {
        Self {
            failing_batches: batches.to_vec(),
            ..Self::default()
        }
    }

    pub fn with_preloaded(docs: Vec<Document>) -> Self {
        let store = Self::default();
        store.batches.lock().unwrap().push(docs);
        store
    }

    pub fn documents(&self) -> Vec<Document> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    fn namespace(&self) -> String {
        "analytics.records".to_string()
    }

    async fn insert_many(&self, docs: Vec<Document>) -> Result<InsertReport> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if self.failing_batches.contains(&call) {
            return Err(Error::Internal(format!("insert {} refused", call)));
        }

        let total = docs.len() as u64;
        let rejected = self.rejected_per_batch.min(total);
        self.batches.lock().unwrap().push(docs);
        Ok(InsertReport {
            inserted: total - rejected,
            failed: rejected,
        })
    }

    async fn aggregate(&self, _pipeline: Vec<Document>) -> Result<Vec<Document>> {
        Ok(Vec::new())
    }

    async fn count_documents(&self, _filter: Document) -> Result<u64> {
        if *self.dropped.lock().unwrap() {
            return Ok(0);
        }
        Ok(self.documents().len() as u64)
    }

    async fn find_one(&self, _filter: Document) -> Result<Option<Document>> {
        Ok(self.documents().into_iter().next())
    }

    async fn create_index(&self, index: &IndexSpec) -> Result<()> {
        if self.failing_indexes.contains(&index.name) {
            return Err(Error::Internal(format!("cannot build {}", index.name)));
        }
        self.indexes.lock().unwrap().push(index.name.clone());
        Ok(())
    }

    async fn list_index_names(&self) -> Result<Vec<String>> {
        let mut names = vec!["_id_".to_string()];
        names.extend(self.indexes.lock().unwrap().iter().cloned());
        Ok(names)
    }

    async fn stats(&self) -> Result<CollectionStats> {
        let count = self.count_documents(Document::new()).await?;
        Ok(CollectionStats {
            count,
            size_bytes: count as f64 * 512.0,
        })
    }

    async fn drop_collection(&self) -> Result<()> {
        *self.dropped.lock().unwrap() = true;
        self.batches.lock().unwrap().clear();
        self.indexes.lock().unwrap().clear();
        Ok(())
    }
}

/// Write `contents` to `name` inside `dir` and return the path
pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("create csv");
    file.write_all(contents.as_bytes()).expect("write csv");
    path
}
