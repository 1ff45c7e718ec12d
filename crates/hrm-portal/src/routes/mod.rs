//! HTTP routes for the HRM portal.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::errors::HrmError;
use crate::handlers::{self, auth, employees, lookups, pages, workdays};
use crate::middleware::{http_metrics_middleware, require_bearer, route_access, RouteAccessState};
use crate::services::{
    AdminClient, AuthService, EmployeeDirectory, EmployeeService, LookupService, WorkDaysService,
};
use axum::{
    middleware,
    routing::{any, get, post},
    Router,
};
use common::clock::Clock;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Application state shared across all handlers.
///
/// Holds no session: each request's session is built from its own cookies.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Admin API client shared by the services below.
    pub admin: AdminClient,

    pub auth: AuthService,

    pub employees: EmployeeService,

    pub workdays: WorkDaysService,

    /// Lookup lists, cached across sessions.
    pub lookups: LookupService,

    /// In-process records behind `/api/employees`.
    pub directory: EmployeeDirectory,

    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wire the services to one admin API client.
    ///
    /// # Errors
    ///
    /// Returns `HrmError::Internal` if the HTTP client cannot be built.
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Result<Self, HrmError> {
        let admin = AdminClient::new(
            &config.admin_api_base_url,
            Duration::from_secs(config.upstream_timeout_seconds),
        )?;

        let lookups = LookupService::new(
            admin.clone(),
            Duration::from_secs(config.lookup_cache_ttl_seconds),
            Duration::from_secs(config.lookup_fetch_timeout_seconds),
            config.lookup_default_user_id.clone(),
        );

        Ok(Self {
            auth: AuthService::new(admin.clone()),
            employees: EmployeeService::new(admin.clone(), Arc::clone(&clock)),
            workdays: WorkDaysService::new(admin.clone(), Arc::clone(&clock)),
            lookups,
            directory: EmployeeDirectory::new(),
            admin,
            config,
            clock,
        })
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health`, `/metrics` - operational endpoints
/// - `/auth/login`, `/auth/logout`, `/auth/session` - cookie session
/// - page routes behind the route filter
/// - `/api/lookups/:param_type` - cached lookup lists (session cookie)
/// - `/api/employees`, `/api/workdays` - bearer authenticated
/// - TraceLayer for request logging
/// - 30 second request timeout
/// - HTTP metrics for every response
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let route_filter = RouteAccessState::new(
        state.config.route_filter_check_expiry,
        Arc::clone(&state.clock),
    );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session_status))
        .route("/api/lookups/:param_type", get(lookups::get_lookup))
        .with_state(state.clone());

    // Metrics route (separate state)
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Page routes, gated on the session cookie
    let page_routes = Router::new()
        .route("/", get(pages::root))
        .route("/login", get(pages::login_page))
        .route("/employees", get(pages::employees_page))
        .route("/employees/:id", get(pages::employee_page))
        .route("/workdays", get(pages::workdays_page))
        .route("/leaves", get(pages::placeholder_page))
        .route("/salary", get(pages::placeholder_page))
        .route("/api-test", get(pages::placeholder_page))
        .route_layer(middleware::from_fn_with_state(route_filter, route_access))
        .with_state(state.clone());

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .route(
            "/api/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/api/employees/:id",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route("/api/workdays", any(workdays::workdays_not_implemented))
        .route("/api/workdays/:id", any(workdays::workdays_not_implemented))
        .route_layer(middleware::from_fn(require_bearer))
        .with_state(state);

    // Layer order (the last layer added runs first):
    // 1. TraceLayer - Log request details (innermost)
    // 2. TimeoutLayer - Timeout the request
    // 3. http_metrics_middleware - Record every response, 408s included (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(page_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // This test verifies that AppState implements Clone,
        // which is required for Axum's State extractor.
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_config_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Config>();
    }
}
