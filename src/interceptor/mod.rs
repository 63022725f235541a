//! Interceptor Module
//!
//! Cache-aside response caching around a request handler.
//!
//! A request is reduced to a [`CacheKey`], its lifetime is resolved by the
//! [`TtlResolver`], and the [`ResponseCache`] asks the store for a fresh body
//! before running the handler. Every cached response carries `X-Cache`,
//! `X-Cache-Key` and `X-Cache-ExpireAt` headers; failed or oversized handler
//! responses pass through untouched.

mod headers;
mod key;
mod layer;
mod orchestrator;
mod ttl;

pub use headers::{annotate, cache_headers, HeaderNames, HIT, MISSED};
pub use key::{canonical_url, resolve_key, CacheKey};
pub use layer::{cache_response, CacheRoute, HandlerFailure};
pub use orchestrator::{CacheOutcome, ResponseCache, Served};
pub use ttl::{parse_minutes, TtlResolver};
