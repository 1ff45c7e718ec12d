//! Observability for the HRM portal.
//!
//! Metric definitions live in [`metrics`]; the HTTP metrics middleware is in
//! `crate::middleware::http_metrics`.

pub mod metrics;
