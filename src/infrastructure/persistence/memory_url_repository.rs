//! In-process implementation of the URL repository.

use async_trait::async_trait;
use chrono::TimeDelta;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{StoreError, UrlRepository, ensure_key};

struct Entry {
    original_url: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Map size at which `save` first sweeps expired entries.
const DEFAULT_SWEEP_THRESHOLD: usize = 1024;

struct Entries {
    map: HashMap<String, Entry>,
    /// Map size that triggers the next sweep.
    sweep_at: usize,
}

/// A repository backed by a process-local map.
///
/// Expired entries are treated as absent on read. They are evicted on read and
/// by a sweep in `save` once the map reaches a size threshold. After each sweep
/// the threshold moves to twice the surviving size, so sweeping stays
/// amortized O(1) per save.
/// A zero or negative ttl stores the entry without expiry.
///
/// # Use Cases
///
/// - HTTP and service tests without a Redis instance
/// - Local development (`STORE_BACKEND=memory`)
pub struct MemoryUrlRepository {
    entries: RwLock<Entries>,
    sweep_threshold: usize,
}

impl Default for MemoryUrlRepository {
    fn default() -> Self {
        Self::with_sweep_threshold(DEFAULT_SWEEP_THRESHOLD)
    }
}

impl MemoryUrlRepository {
    pub fn new() -> Self {
        debug!("Using in-memory url store");
        Self::default()
    }

    /// Creates a repository that sweeps expired entries once `threshold` are stored.
    pub fn with_sweep_threshold(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            entries: RwLock::new(Entries {
                map: HashMap::new(),
                sweep_at: threshold,
            }),
            sweep_threshold: threshold,
        }
    }

    /// Number of live (non-expired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .map
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn save(&self, record: &UrlRecord, ttl: TimeDelta) -> Result<(), StoreError> {
        ensure_key(&record.short_code)?;

        let expires_at = ttl
            .to_std()
            .ok()
            .filter(|ttl| !ttl.is_zero())
            .map(|ttl| Instant::now() + ttl);

        let mut entries = self.entries.write().await;
        if entries.map.len() >= entries.sweep_at {
            let now = Instant::now();
            let before = entries.map.len();
            entries.map.retain(|_, entry| !entry.is_expired(now));
            let remaining = entries.map.len();
            entries.sweep_at = (remaining * 2).max(self.sweep_threshold);
            debug!(evicted = before - remaining, remaining, "Swept expired urls");
        }

        entries.map.insert(
            record.short_code.clone(),
            Entry {
                original_url: record.original_url.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, short_code: &str) -> Result<UrlRecord, StoreError> {
        ensure_key(short_code)?;

        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.map.get(short_code) {
                Some(entry) if !entry.is_expired(now) => {
                    return Ok(UrlRecord::with_code(short_code, entry.original_url.clone()));
                }
                Some(_) => {}
                None => return Err(StoreError::NotFound),
            }
        }

        let mut entries = self.entries.write().await;
        if entries.map.get(short_code).is_some_and(|e| e.is_expired(now)) {
            entries.map.remove(short_code);
        }
        Err(StoreError::NotFound)
    }

    async fn delete(&self, short_code: &str) -> Result<(), StoreError> {
        ensure_key(short_code)?;

        self.entries.write().await.map.remove(short_code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
