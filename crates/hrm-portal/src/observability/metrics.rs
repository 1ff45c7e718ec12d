//! Metrics definitions for the HRM portal.
//!
//! All metrics follow Prometheus naming conventions:
//! - `hrm_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: ~20 values (parameterized paths, everything else is `/other`)
//! - `status`: 3 values (success, error, timeout)
//! - `operation`: bounded by code (login, list_employees, lookup_items, ...)
//! - `cache` / `outcome`: bounded by code
//! - `reason`: 3 values (requested, session_expired, upstream_unauthorized)

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle that renders it.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("hrm_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Admin API calls are bounded by the upstream timeout (30s default)
        .set_buckets_for_metric(
            Matcher::Prefix("hrm_upstream_request".to_string()),
            &[
                0.010, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000, 30.000,
            ],
        )
        .map_err(|e| format!("Failed to set upstream request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `hrm_http_requests_total`, `hrm_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
///
/// Includes framework-level rejections (415, 400 on JSON parse errors, 404,
/// 405) and route filter redirects.
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("hrm_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("hrm_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
///
/// Redirects count as success: the route filter answers most unauthenticated
/// page loads with a 303.
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=399 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/" | "/health" | "/metrics" | "/login" | "/employees" | "/workdays" | "/leaves"
        | "/salary" | "/api-test" | "/auth/login" | "/auth/logout" | "/auth/session"
        | "/api/employees" | "/api/workdays" => path.to_string(),
        _ => normalize_dynamic_endpoint(path),
    }
}

/// Replace the trailing ID segment of known collections with a placeholder.
fn normalize_dynamic_endpoint(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();

    match parts.as_slice() {
        ["", "employees", id] if !id.is_empty() => "/employees/{id}".to_string(),
        ["", "api", "employees", id] if !id.is_empty() => "/api/employees/{id}".to_string(),
        ["", "api", "workdays", id] if !id.is_empty() => "/api/workdays/{id}".to_string(),
        ["", "api", "lookups", param] if !param.is_empty() => {
            "/api/lookups/{param_type}".to_string()
        }
        // Unknown paths normalized to "/other" to bound cardinality
        _ => "/other".to_string(),
    }
}

// ============================================================================
// Admin API Metrics
// ============================================================================

/// Record an admin API call
///
/// Metric: `hrm_upstream_request_duration_seconds`, `hrm_upstream_requests_total`
/// Labels: `operation`, `status`
///
/// `status` is the HTTP status code, or `timeout` / `error` when no response
/// was received.
pub fn record_upstream_request(operation: &str, status: &str, duration: Duration) {
    histogram!("hrm_upstream_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("hrm_upstream_requests_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Cache Metrics
// ============================================================================

/// Record a request cache lookup
///
/// Metric: `hrm_cache_lookups_total`
/// Labels: `cache`, `outcome` (hit, joined, miss, error, timeout)
pub fn record_cache_lookup(cache: &'static str, outcome: &'static str) {
    counter!("hrm_cache_lookups_total",
        "cache" => cache,
        "outcome" => outcome
    )
    .increment(1);
}

// ============================================================================
// Session Metrics
// ============================================================================

/// Record a session being ended
///
/// Metric: `hrm_session_logouts_total`
/// Labels: `reason`
pub fn record_session_logout(reason: &'static str) {
    counter!("hrm_session_logouts_total",
        "reason" => reason
    )
    .increment(1);
}

// ============================================================================
// Tests
// ============================================================================
