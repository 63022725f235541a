//! Error types for the response cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the cache itself, independent of the wrapped handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Request carries no usable identity (e.g. no host)
    #[error("Cannot derive cache key: {0}")]
    KeyDerivation(String),

    /// Backing store could not serve the lookup
    #[error("Cache store unavailable: {0}")]
    StoreUnavailable(String),

    /// Key or value rejected by store limits
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Handler response body could not be buffered
    #[error("Unreadable response body: {0}")]
    Body(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::KeyDerivation(_) => StatusCode::BAD_REQUEST,
            CacheError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Body(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Intercept Error ==
/// Failure of one intercepted call: either the cache or the wrapped handler.
///
/// Handler errors are carried through untouched so the caller sees exactly
/// what the handler produced.
#[derive(Error, Debug)]
pub enum InterceptError<E> {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Handler failed: {0}")]
    Handler(E),
}

impl<E> InterceptError<E> {
    /// Returns the cache error, if this is one.
    pub fn as_cache(&self) -> Option<&CacheError> {
        match self {
            InterceptError::Cache(err) => Some(err),
            InterceptError::Handler(_) => None,
        }
    }

    /// Returns true when the wrapped handler failed.
    pub fn is_handler(&self) -> bool {
        matches!(self, InterceptError::Handler(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
