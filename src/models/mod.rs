//! Request and Response models for the demo API
//!
//! DTOs serialized by the routes that sit behind the response cache.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::WidgetQuery;
pub use responses::{
    ErrorResponse, HealthResponse, ReportResponse, StatsResponse, WidgetResponse,
};
