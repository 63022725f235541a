//! Cache Store Module
//!
//! The boundary between the interceptor and whatever backs the cache.

use std::future::Future;

use async_trait::async_trait;
use axum::body::Bytes;

use crate::cache::CacheEntry;
use crate::error::InterceptError;

// == Lookup ==
/// Result of one get-or-compute call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub entry: CacheEntry,
    /// True when the entry was already present and fresh
    pub hit: bool,
}

impl Lookup {
    pub fn hit(entry: CacheEntry) -> Self {
        Self { entry, hit: true }
    }

    pub fn miss(entry: CacheEntry) -> Self {
        Self { entry, hit: false }
    }
}

// == Response Store ==
/// A key-value store offering atomic get-or-compute with a TTL.
///
/// Implementations return the fresh entry for `key` if one exists. Otherwise
/// they run `compute`, store its content for `minutes`, and return it. A
/// failed compute stores nothing and its error is returned as is.
///
/// Whether concurrent misses on one key run `compute` once or several times
/// is up to the implementation; [`MemoryStore`](crate::cache::MemoryStore)
/// runs it once.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        minutes: u64,
        compute: F,
    ) -> Result<Lookup, InterceptError<E>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Bytes, InterceptError<E>>> + Send,
        E: Send;
}
