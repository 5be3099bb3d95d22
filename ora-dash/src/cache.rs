//! Time-to-live memoization of dashboard query results
//!
//! Entries are keyed by query name (plus parameters, e.g. `top_products:10`)
//! and hold the JSON the handler returned. An entry older than the current
//! window is treated as absent and recomputed by the caller.

use ora_common::config::clamp_cache_ttl;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Cached query result
#[derive(Debug, Clone)]
pub struct CachedResult {
    pub data: Value,
    pub cached_at: Instant,
}

impl CachedResult {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
        }
    }

    /// Check if this result is still valid given TTL
    pub fn is_valid(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }
}

/// Snapshot returned by `GET /api/cache`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CacheStatus {
    pub ttl_secs: u64,
    /// Entries currently stored, expired ones included
    pub entries: usize,
    pub valid_entries: usize,
}

/// Query result cache with an adjustable window
pub struct QueryCache {
    entries: RwLock<HashMap<String, CachedResult>>,
    ttl_secs: AtomicU64,
}

impl QueryCache {
    /// `ttl_secs` is clamped to the accepted 60..=3600 range
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl_secs: AtomicU64::new(clamp_cache_ttl(ttl_secs)),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.load(Ordering::Relaxed))
    }

    /// Change the window; returns the value actually applied
    pub fn set_ttl(&self, ttl_secs: u64) -> u64 {
        let applied = clamp_cache_ttl(ttl_secs);
        self.ttl_secs.store(applied, Ordering::Relaxed);
        applied
    }

    /// Get a cached result if it is still inside the window
    pub fn get(&self, key: &str) -> Option<Value> {
        let ttl = self.ttl();
        let entries = self.entries.read().ok()?;
        entries
            .get(key)
            .filter(|entry| entry.is_valid(ttl))
            .map(|entry| entry.data.clone())
    }

    pub fn insert(&self, key: impl Into<String>, data: Value) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.into(), CachedResult::new(data));
        }
    }

    /// Drop every entry; returns how many were removed
    pub fn clear(&self) -> usize {
        match self.entries.write() {
            Ok(mut entries) => {
                let removed = entries.len();
                entries.clear();
                removed
            }
            Err(_) => 0,
        }
    }

    pub fn status(&self) -> CacheStatus {
        let ttl = self.ttl();
        let (entries, valid_entries) = match self.entries.read() {
            Ok(entries) => (
                entries.len(),
                entries.values().filter(|e| e.is_valid(ttl)).count(),
            ),
            Err(_) => (0, 0),
        };

        CacheStatus {
            ttl_secs: ttl.as_secs(),
            entries,
            valid_entries,
        }
    }

    #[cfg(test)]
    fn backdate(&self, key: &str, age: Duration) {
        if let Some(entry) = self.entries.write().unwrap().get_mut(key) {
            entry.cached_at = Instant::now() - age;
        }
    }
}
