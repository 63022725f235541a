//! API Routes
//!
//! Configures the Axum router and attaches the response cache to the
//! cached endpoints.

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    flaky_handler, health_handler, reports_handler, stats_handler, widgets_handler, AppState,
};
use crate::cache::MemoryStore;
use crate::interceptor::{cache_response, CacheRoute};

/// Lifetime requested by `/reports`, above the default floor
pub const REPORT_MINUTES: i64 = 30;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /widgets?id=N` - cached for the default lifetime
/// - `GET /reports` - cached for [`REPORT_MINUTES`]
/// - `GET /flaky` - cached route whose handler always fails
/// - `GET /stats` - cache statistics
/// - `GET /health` - health check
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let default_ttl = CacheRoute::new(state.cache.clone());
    let report_ttl = CacheRoute::new(state.cache.clone()).minutes(REPORT_MINUTES);

    let cached = Router::new()
        .route("/widgets", get(widgets_handler))
        .route("/flaky", get(flaky_handler))
        .route_layer(middleware::from_fn_with_state(
            default_ttl,
            cache_response::<MemoryStore>,
        ));

    let reports = Router::new()
        .route("/reports", get(reports_handler))
        .route_layer(middleware::from_fn_with_state(
            report_ttl,
            cache_response::<MemoryStore>,
        ));

    Router::new()
        .merge(cached)
        .merge(reports)
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
