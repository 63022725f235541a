//! In-Memory Store Module
//!
//! HashMap-backed response store with LRU eviction, TTL expiration and
//! per-key single-flight population.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::cache::{
    CacheEntry, CacheStats, Clock, Lookup, LruTracker, ResponseStore, SystemClock, MAX_KEY_LENGTH,
    MAX_VALUE_SIZE,
};
use crate::error::{CacheError, InterceptError};

// == Entries ==
/// Synchronous core guarded by the store's lock.
#[derive(Debug)]
struct Entries {
    map: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    max_entries: usize,
}

impl Entries {
    fn new(max_entries: usize) -> Self {
        Self {
            map: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
        }
    }

    /// Returns the entry if fresh; drops it if expired.
    fn fresh(&mut self, key: &str, clock: &dyn Clock) -> Option<CacheEntry> {
        let entry = self.map.get(key)?;
        if entry.is_expired_at(clock.now()) {
            self.map.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.map.len());
            return None;
        }

        let entry = entry.clone();
        self.lru.touch(key);
        Some(entry)
    }

    fn insert(&mut self, key: &str, entry: CacheEntry) {
        if !self.map.contains_key(key) && self.map.len() >= self.max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.map.remove(&evicted);
                self.stats.record_eviction();
                debug!(key = %evicted, "Evicted least recently used response");
            }
        }

        self.map.insert(key.to_string(), entry);
        self.lru.touch(key);
        self.stats.set_total_entries(self.map.len());
    }
}

// == Memory Store ==
/// Process-local [`ResponseStore`].
///
/// Concurrent misses on the same key wait on a per-key gate so the compute
/// closure runs once; waiters then read the populated entry.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<Entries>,
    gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    clock: Arc<dyn Clock>,
    max_value_size: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` responses.
    pub fn new(max_entries: usize) -> Self {
        Self::with_clock(max_entries, Arc::new(SystemClock))
    }

    /// Creates a store that reads time from `clock`.
    pub fn with_clock(max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(Entries::new(max_entries.max(1))),
            gates: Mutex::new(HashMap::new()),
            clock,
            max_value_size: MAX_VALUE_SIZE,
        }
    }

    /// Overrides the largest body that will be stored.
    pub fn with_max_value_size(mut self, bytes: usize) -> Self {
        self.max_value_size = bytes;
        self
    }

    // == Get ==
    /// Reads a fresh entry without touching statistics or LRU order.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let entries = self.entries.read().await;
        entries
            .map
            .get(key)
            .filter(|entry| !entry.is_expired_at(self.clock.now()))
            .cloned()
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let mut stats = entries.stats.clone();
        stats.set_total_entries(entries.map.len());
        stats
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.map.is_empty()
    }

    // == Cleanup Expired ==
    /// Drops expired entries and idle gates. Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = {
            let mut entries = self.entries.write().await;
            let expired: Vec<String> = entries
                .map
                .iter()
                .filter(|(_, entry)| entry.is_expired_at(now))
                .map(|(key, _)| key.clone())
                .collect();

            for key in &expired {
                entries.map.remove(key);
                entries.lru.remove(key);
            }

            entries.stats.record_expirations(expired.len());
            let len = entries.map.len();
            entries.stats.set_total_entries(len);
            expired.len()
        };

        // A gate only referenced by the map has no caller waiting on it.
        self.gates
            .lock()
            .await
            .retain(|_, gate| Arc::strong_count(gate) > 1);

        removed
    }

    async fn lookup(&self, key: &str) -> Option<CacheEntry> {
        let mut entries = self.entries.write().await;
        let entry = entries.fresh(key, self.clock.as_ref());
        if entry.is_some() {
            entries.stats.record_hit();
        }
        entry
    }

    async fn gate(&self, key: &str) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock().await;
        Arc::clone(gates.entry(key.to_string()).or_default())
    }

    async fn release(&self, key: &str, gate: &Arc<Mutex<()>>) {
        let mut gates = self.gates.lock().await;
        if gates.get(key).is_some_and(|current| Arc::ptr_eq(current, gate)) {
            gates.remove(key);
        }
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        minutes: u64,
        compute: F,
    ) -> Result<Lookup, InterceptError<E>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Bytes, InterceptError<E>>> + Send,
        E: Send,
    {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key must be 1 to {} bytes",
                MAX_KEY_LENGTH
            ))
            .into());
        }

        if let Some(entry) = self.lookup(key).await {
            return Ok(Lookup::hit(entry));
        }

        let gate = self.gate(key).await;
        let _held = gate.lock().await;

        // Another caller may have populated the key while we waited.
        if let Some(entry) = self.lookup(key).await {
            self.release(key, &gate).await;
            return Ok(Lookup::hit(entry));
        }

        self.entries.write().await.stats.record_miss();
        let computed = compute().await;

        let result = match computed {
            Ok(content) => {
                let entry = CacheEntry::new(content, self.clock.now(), minutes);
                if entry.content.len() > self.max_value_size {
                    warn!(
                        key = %key,
                        size = entry.content.len(),
                        limit = self.max_value_size,
                        "Response body too large to cache, serving uncached"
                    );
                } else {
                    self.entries.write().await.insert(key, entry.clone());
                }
                Ok(Lookup::miss(entry))
            }
            Err(err) => Err(err),
        };

        self.release(key, &gate).await;
        result
    }
}
