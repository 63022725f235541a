//! API Module
//!
//! Demo HTTP surface showing the response cache in front of real handlers.
//!
//! # Endpoints
//! - `GET /widgets?id=N` - cached, default lifetime
//! - `GET /reports` - cached, 30 minutes
//! - `GET /flaky` - cached route that always fails
//! - `GET /stats` - cache statistics
//! - `GET /health` - health check

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_router, REPORT_MINUTES};
