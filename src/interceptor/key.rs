//! Cache Key Resolution
//!
//! Derives a stable cache key from the full URL of a request.

use std::fmt;

use axum::http::{header, HeaderMap, Request};
use md5::{Digest, Md5};

use crate::error::{CacheError, Result};

const FORWARDED_PROTO: &str = "x-forwarded-proto";

// == Cache Key ==
/// Lowercase hex MD5 of a canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Digests an already canonical URL.
    pub fn from_url(url: &str) -> Self {
        Self(hex::encode(Md5::digest(url.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// == Resolve Key ==
/// Returns the cache key for a request.
///
/// Two requests share a key exactly when their canonical URLs match.
pub fn resolve_key<B>(request: &Request<B>) -> Result<CacheKey> {
    canonical_url(request).map(|url| CacheKey::from_url(&url))
}

// == Canonical URL ==
/// Rebuilds `scheme://host/path?query` for a request.
///
/// Origin-form requests (the usual HTTP/1.1 case) take the host from the
/// `Host` header and the scheme from `X-Forwarded-Proto`, defaulting to
/// `http`. Host and scheme are lowercased and query parameters are ordered
/// by name, so `?b=2&a=1` and `?a=1&b=2` name the same resource. Values of a
/// repeated parameter keep their order.
pub fn canonical_url<B>(request: &Request<B>) -> Result<String> {
    let uri = request.uri();

    let scheme = match uri.scheme_str() {
        Some(scheme) => scheme.to_ascii_lowercase(),
        None => forwarded_proto(request.headers()).unwrap_or_else(|| "http".to_string()),
    };

    let host = match uri.authority() {
        Some(authority) => authority.as_str().to_ascii_lowercase(),
        None => host_header(request.headers())?,
    };

    let mut url = format!("{}://{}{}", scheme, host, uri.path());
    if let Some(query) = uri.query().map(normalize_query).filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(&query);
    }

    Ok(url)
}

fn host_header(headers: &HeaderMap) -> Result<String> {
    let value = headers
        .get(header::HOST)
        .ok_or_else(|| CacheError::KeyDerivation("request has no host".to_string()))?;

    let host = value
        .to_str()
        .map_err(|_| CacheError::KeyDerivation("host header is not valid ASCII".to_string()))?
        .trim();

    if host.is_empty() {
        return Err(CacheError::KeyDerivation("host header is empty".to_string()));
    }

    Ok(host.to_ascii_lowercase())
}

fn forwarded_proto(headers: &HeaderMap) -> Option<String> {
    headers
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

fn normalize_query(query: &str) -> String {
    let mut pairs: Vec<&str> = query.split('&').filter(|pair| !pair.is_empty()).collect();
    // Stable, so `tag=b&tag=a` stays distinct from `tag=a&tag=b`
    pairs.sort_by(|a, b| param_name(a).cmp(param_name(b)));
    pairs.join("&")
}

fn param_name(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(name, _)| name)
}
