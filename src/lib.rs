//! Response Cache - cache-aside HTTP response caching for axum
//!
//! Serves repeated requests from a TTL cache keyed by the request URL,
//! with a minimum cache lifetime and `X-Cache` diagnostic headers.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{MemoryStore, ResponseStore};
pub use config::Config;
pub use error::{CacheError, InterceptError};
pub use interceptor::{cache_response, CacheRoute, ResponseCache};
pub use tasks::spawn_cleanup_task;
