//! API Handlers
//!
//! Demo endpoints. `/widgets`, `/reports` and `/flaky` sit behind the
//! response cache; `/stats` and `/health` are served directly.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::cache::MemoryStore;
use crate::config::Config;
use crate::interceptor::ResponseCache;
use crate::models::{
    ErrorResponse, HealthResponse, ReportResponse, StatsResponse, WidgetQuery, WidgetResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Response cache shared by every cached route
    pub cache: Arc<ResponseCache<MemoryStore>>,
}

impl AppState {
    pub fn new(cache: ResponseCache<MemoryStore>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(ResponseCache::from_config(config)?))
    }
}

/// Handler for GET /widgets?id=N
pub async fn widgets_handler(Query(query): Query<WidgetQuery>) -> Json<WidgetResponse> {
    Json(WidgetResponse::new(query.id.unwrap_or(1)))
}

/// Handler for GET /reports
pub async fn reports_handler() -> Json<ReportResponse> {
    Json(ReportResponse::daily())
}

/// Handler for GET /flaky
///
/// Always fails, so nothing is ever cached for it.
pub async fn flaky_handler() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new("upstream unavailable")),
    )
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.store().stats().await;
    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_widgets_handler_defaults_id() {
        let response = widgets_handler(Query(WidgetQuery::default())).await;
        assert_eq!(response.id, 1);
        assert_eq!(response.name, "widget-1");
    }

    #[tokio::test]
    async fn test_flaky_handler_is_server_error() {
        let (status, body) = flaky_handler().await;
        assert!(status.is_server_error());
        assert_eq!(body.error, "upstream unavailable");
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = AppState::from_config(&Config::default()).unwrap();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(response.total_entries, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
