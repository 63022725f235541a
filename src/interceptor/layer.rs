//! Axum Middleware
//!
//! Attaches a [`ResponseCache`] to routes via `axum::middleware::from_fn_with_state`.

use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::cache::ResponseStore;
use crate::error::InterceptError;
use crate::interceptor::{parse_minutes, ResponseCache};

// == Handler Failure ==
/// A downstream response with a non-2xx status.
///
/// It is handed back to the client as is and never cached.
#[derive(Debug)]
pub struct HandlerFailure(pub Response);

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler responded with {}", self.0.status())
    }
}

// == Cache Route ==
/// Middleware state: the shared cache plus this route's explicit TTL.
///
/// ```ignore
/// let route = CacheRoute::new(cache.clone()).minutes(30);
/// Router::new()
///     .route("/reports", get(reports_handler))
///     .route_layer(middleware::from_fn_with_state(route, cache_response::<MemoryStore>));
/// ```
pub struct CacheRoute<S> {
    cache: Arc<ResponseCache<S>>,
    minutes: Option<i64>,
}

impl<S> CacheRoute<S> {
    /// A route cached for the default lifetime.
    pub fn new(cache: Arc<ResponseCache<S>>) -> Self {
        Self {
            cache,
            minutes: None,
        }
    }

    /// Requests a longer lifetime for this route.
    pub fn minutes(mut self, minutes: i64) -> Self {
        self.minutes = Some(minutes);
        self
    }

    /// Same as [`minutes`](Self::minutes) from a textual parameter such as `"15"`.
    pub fn minutes_param(self, raw: &str) -> Self {
        self.minutes(parse_minutes(raw))
    }

    pub fn explicit_minutes(&self) -> Option<i64> {
        self.minutes
    }
}

impl<S> Clone for CacheRoute<S> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            minutes: self.minutes,
        }
    }
}

// == Cache Response ==
/// Middleware function serving the wrapped route through the cache.
pub async fn cache_response<S>(
    State(route): State<CacheRoute<S>>,
    request: Request,
    next: Next,
) -> Response
where
    S: ResponseStore + 'static,
{
    let handler = move |request: Request| async move {
        let response = next.run(request).await;
        if !response.status().is_success() {
            Err(HandlerFailure(response))
        } else {
            Ok(response)
        }
    };

    match route.cache.handle(request, handler, route.minutes).await {
        Ok(response) => response,
        Err(InterceptError::Handler(HandlerFailure(response))) => {
            warn!(status = %response.status(), "Handler failed, response not cached");
            response
        }
        Err(InterceptError::Cache(err)) => {
            warn!(error = %err, "Response cache unavailable for request");
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use axum::{
        body::Body,
        http::{header, Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::util::ServiceExt;

    fn app(route: CacheRoute<MemoryStore>, calls: Arc<AtomicUsize>, status: StatusCode) -> Router {
        Router::new()
            .route(
                "/widgets",
                get(move || {
                    let calls = Arc::clone(&calls);
                    async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                        (status, format!("call {}", n))
                    }
                }),
            )
            .route_layer(middleware::from_fn_with_state(
                route,
                cache_response::<MemoryStore>,
            ))
    }

    fn request() -> Request {
        HttpRequest::builder()
            .uri("/widgets?id=7")
            .header(header::HOST, "host")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_cache_route_minutes() {
        let cache = Arc::new(ResponseCache::new(MemoryStore::new(10)));
        let route = CacheRoute::new(cache);
        assert_eq!(route.explicit_minutes(), None);
        assert_eq!(route.clone().minutes(30).explicit_minutes(), Some(30));
        assert_eq!(route.minutes_param("15.5").explicit_minutes(), Some(15));
    }

    #[test]
    fn test_handler_failure_display() {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::BAD_GATEWAY;
        assert_eq!(
            HandlerFailure(response).to_string(),
            "handler responded with 502 Bad Gateway"
        );
    }

    #[tokio::test]
    async fn test_middleware_caches_success() {
        let cache = Arc::new(ResponseCache::new(MemoryStore::new(10)));
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app(CacheRoute::new(cache), Arc::clone(&calls), StatusCode::OK);

        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.headers()["x-cache"], "Missed");

        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(second.headers()["x-cache"], "Hit");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_middleware_passes_server_errors_through() {
        let cache = Arc::new(ResponseCache::new(MemoryStore::new(10)));
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app(
            CacheRoute::new(Arc::clone(&cache)),
            Arc::clone(&calls),
            StatusCode::INTERNAL_SERVER_ERROR,
        );

        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!first.headers().contains_key("x-cache"));

        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_middleware_passes_client_errors_through() {
        let cache = Arc::new(ResponseCache::new(MemoryStore::new(10)));
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app(
            CacheRoute::new(Arc::clone(&cache)),
            Arc::clone(&calls),
            StatusCode::NOT_FOUND,
        );

        for _ in 0..2 {
            let response = app.clone().oneshot(request()).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert!(!response.headers().contains_key("x-cache"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_middleware_serves_large_body_uncached() {
        let cache = Arc::new(ResponseCache::new(MemoryStore::new(10)).with_max_body_bytes(4));
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app(CacheRoute::new(Arc::clone(&cache)), Arc::clone(&calls), StatusCode::OK);

        for n in 1..=2 {
            let response = app.clone().oneshot(request()).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(!response.headers().contains_key("x-cache"));
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            assert_eq!(body, format!("call {}", n));
        }

        assert!(cache.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_middleware_rejects_request_without_host() {
        let cache = Arc::new(ResponseCache::new(MemoryStore::new(10)));
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app(CacheRoute::new(cache), Arc::clone(&calls), StatusCode::OK);

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/widgets")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
