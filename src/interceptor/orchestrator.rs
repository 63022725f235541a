//! Cache-Aside Orchestration
//!
//! Ties key resolution, TTL resolution and the store together around a
//! single handler call.

use std::future::Future;

use axum::body::{to_bytes, Body, HttpBody};
use axum::http::header::{self, InvalidHeaderName};
use axum::http::{HeaderMap, Request};
use axum::response::Response;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, MemoryStore, ResponseStore, MAX_VALUE_SIZE};
use crate::config::Config;
use crate::error::{CacheError, InterceptError};
use crate::interceptor::{annotate, resolve_key, CacheKey, HeaderNames, TtlResolver};

// == Cache Outcome ==
/// How one request was served. Lives for a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOutcome {
    pub key: CacheKey,
    pub hit: bool,
    pub entry: CacheEntry,
}

// == Served ==
/// What a lookup produced for one request.
#[derive(Debug)]
pub enum Served {
    /// Body read from, or just written to, the store
    Cached(CacheOutcome),
    /// Handler response too large to cache, returned as produced
    Uncached(Response),
}

impl Served {
    /// The cache outcome, unless the response bypassed the store.
    pub fn outcome(&self) -> Option<&CacheOutcome> {
        match self {
            Served::Cached(outcome) => Some(outcome),
            Served::Uncached(_) => None,
        }
    }
}

/// Why a compute step stored nothing.
enum Skipped<E> {
    Failed(E),
    TooLarge(Response),
}

// == Response Cache ==
/// Serves handler responses from a [`ResponseStore`].
///
/// Holds only configuration, so one instance can serve any number of
/// concurrent requests.
#[derive(Debug)]
pub struct ResponseCache<S> {
    store: S,
    ttl: TtlResolver,
    headers: HeaderNames,
    max_body_bytes: usize,
}

impl ResponseCache<MemoryStore> {
    /// Builds an in-memory cache from configuration.
    pub fn from_config(config: &Config) -> Result<Self, InvalidHeaderName> {
        let store = MemoryStore::new(config.max_entries).with_max_value_size(config.max_body_bytes);

        Ok(Self::new(store)
            .with_default_minutes(config.default_minutes)
            .with_header_names(HeaderNames::from_config(config)?)
            .with_max_body_bytes(config.max_body_bytes))
    }
}

impl<S: ResponseStore> ResponseCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            ttl: TtlResolver::default(),
            headers: HeaderNames::default(),
            max_body_bytes: MAX_VALUE_SIZE,
        }
    }

    pub fn with_default_minutes(mut self, minutes: u64) -> Self {
        self.ttl = TtlResolver::new(minutes);
        self
    }

    pub fn with_header_names(mut self, names: HeaderNames) -> Self {
        self.headers = names;
        self
    }

    /// Largest handler body that will be cached. Larger bodies are served
    /// uncached.
    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ttl(&self) -> &TtlResolver {
        &self.ttl
    }

    pub fn header_names(&self) -> &HeaderNames {
        &self.headers
    }

    // == Handle ==
    /// Returns the cached body for `request`, running `handler` on a miss.
    ///
    /// A cached response is always a fresh `200 OK` carrying the body plus
    /// the cache status headers. Status and headers set by the handler are
    /// not replayed. A body over the size limit is returned exactly as the
    /// handler produced it, without cache headers.
    pub async fn handle<B, H, Fut, E>(
        &self,
        request: Request<B>,
        handler: H,
        explicit_minutes: Option<i64>,
    ) -> Result<Response, InterceptError<E>>
    where
        B: Send,
        H: FnOnce(Request<B>) -> Fut + Send,
        Fut: Future<Output = Result<Response, E>> + Send,
        E: Send,
    {
        match self.lookup(request, handler, explicit_minutes).await? {
            Served::Cached(outcome) => Ok(self.respond(&outcome)),
            Served::Uncached(response) => Ok(response),
        }
    }

    // == Lookup ==
    /// Resolves how `request` is served without building a cached response.
    pub async fn lookup<B, H, Fut, E>(
        &self,
        request: Request<B>,
        handler: H,
        explicit_minutes: Option<i64>,
    ) -> Result<Served, InterceptError<E>>
    where
        B: Send,
        H: FnOnce(Request<B>) -> Fut + Send,
        Fut: Future<Output = Result<Response, E>> + Send,
        E: Send,
    {
        let key = resolve_key(&request)?;
        let minutes = self.ttl.resolve_minutes(explicit_minutes);
        let limit = self.max_body_bytes;

        let computed = self
            .store
            .get_or_compute(key.as_str(), minutes, move || async move {
                let response = handler(request)
                    .await
                    .map_err(|err| InterceptError::Handler(Skipped::Failed(err)))?;

                let (parts, body) = response.into_parts();
                if declared_length(&parts.headers, &body) > limit {
                    let response = Response::from_parts(parts, body);
                    return Err(InterceptError::Handler(Skipped::TooLarge(response)));
                }

                // Bodies without a declared length are measured after buffering
                let bytes = to_bytes(body, usize::MAX)
                    .await
                    .map_err(|err| CacheError::Body(err.to_string()))?;
                if bytes.len() > limit {
                    let response = Response::from_parts(parts, Body::from(bytes));
                    return Err(InterceptError::Handler(Skipped::TooLarge(response)));
                }

                Ok::<_, InterceptError<Skipped<E>>>(bytes)
            })
            .await;

        let lookup = match computed {
            Ok(lookup) => lookup,
            Err(InterceptError::Handler(Skipped::TooLarge(response))) => {
                warn!(key = %key, limit, "Response body too large to cache, serving uncached");
                return Ok(Served::Uncached(response));
            }
            Err(InterceptError::Handler(Skipped::Failed(err))) => {
                return Err(InterceptError::Handler(err));
            }
            Err(InterceptError::Cache(err)) => return Err(err.into()),
        };

        debug!(
            key = %key,
            minutes,
            hit = lookup.hit,
            expires_at = %lookup.entry.expires_at,
            "Response cache lookup"
        );

        Ok(Served::Cached(CacheOutcome {
            key,
            hit: lookup.hit,
            entry: lookup.entry,
        }))
    }

    /// Builds the outgoing response for an outcome.
    pub fn respond(&self, outcome: &CacheOutcome) -> Response {
        let response = Response::new(Body::from(outcome.entry.content.clone()));
        annotate(response, outcome, &self.headers)
    }
}

/// Body length known before reading it, from `Content-Length` or the body's
/// size hint. Zero when neither is known.
fn declared_length(headers: &HeaderMap, body: &Body) -> usize {
    let from_header = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let declared = from_header.max(body.size_hint().lower());
    usize::try_from(declared).unwrap_or(usize::MAX)
}
