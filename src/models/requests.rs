//! Request DTOs for the demo API
//!
//! Query parameters accepted by the cached routes.

use serde::Deserialize;

/// Query string for `GET /widgets`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WidgetQuery {
    /// Widget identifier; part of the URL and therefore of the cache key
    #[serde(default)]
    pub id: Option<u32>,
}
