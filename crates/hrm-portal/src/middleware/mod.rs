//! Middleware for the HRM portal.
//!
//! # Components
//!
//! - `auth` - Bearer authentication and roles for the JSON routes
//! - `http_metrics` - Request metrics for every response
//! - `route_access` - Session-cookie gate in front of page routes

pub mod auth;
pub mod http_metrics;
pub mod route_access;

pub use auth::{require_bearer, Caller};
pub use http_metrics::http_metrics_middleware;
pub use route_access::{route_access, RouteAccessState};
