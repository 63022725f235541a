//! Cache Status Headers
//!
//! Diagnostic headers describing how a response was served.

use axum::http::header::InvalidHeaderName;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use tracing::warn;

use crate::config::Config;
use crate::interceptor::CacheOutcome;

/// `X-Cache` value for a response served from the store
pub const HIT: &str = "Hit";

/// `X-Cache` value for a response produced by the handler
pub const MISSED: &str = "Missed";

// == Header Names ==
/// Names of the three diagnostic headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNames {
    pub status: HeaderName,
    pub key: HeaderName,
    pub expire_at: HeaderName,
}

impl HeaderNames {
    pub fn parse(
        status: &str,
        key: &str,
        expire_at: &str,
    ) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            status: HeaderName::try_from(status)?,
            key: HeaderName::try_from(key)?,
            expire_at: HeaderName::try_from(expire_at)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, InvalidHeaderName> {
        Self::parse(
            &config.status_header,
            &config.key_header,
            &config.expire_at_header,
        )
    }
}

impl Default for HeaderNames {
    fn default() -> Self {
        Self {
            status: HeaderName::from_static("x-cache"),
            key: HeaderName::from_static("x-cache-key"),
            expire_at: HeaderName::from_static("x-cache-expireat"),
        }
    }
}

// == Cache Headers ==
/// Builds the diagnostic headers for one outcome.
///
/// A value that cannot be sent as a header is left out.
pub fn cache_headers(outcome: &CacheOutcome, names: &HeaderNames) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(3);

    let status = if outcome.hit { HIT } else { MISSED };
    headers.insert(names.status.clone(), HeaderValue::from_static(status));

    for (name, value) in [
        (&names.key, outcome.key.to_string()),
        (&names.expire_at, outcome.entry.expire_at_display()),
    ] {
        match HeaderValue::try_from(value) {
            Ok(value) => {
                headers.insert(name.clone(), value);
            }
            Err(err) => warn!(header = %name, error = %err, "Skipping cache header"),
        }
    }

    headers
}

// == Annotate ==
/// Appends the diagnostic headers to `response`.
///
/// Existing headers, including ones with the same names, are kept.
pub fn annotate(mut response: Response, outcome: &CacheOutcome, names: &HeaderNames) -> Response {
    let target = response.headers_mut();
    for (name, value) in cache_headers(outcome, names) {
        if let Some(name) = name {
            target.append(name, value);
        }
    }
    response
}
