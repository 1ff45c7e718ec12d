//! HTTP request handlers for the HRM portal.
//!
//! Handlers that reach the admin API on the caller's behalf build a
//! [`RequestSession`] from the request's cookies and return its jar with the
//! response, so cookie writes (login) and removals (logout, 401) reach the
//! browser.

pub mod auth;
pub mod employees;
pub mod health;
pub mod lookups;
pub mod metrics;
pub mod pages;
pub mod workdays;

pub use health::health_check;
pub use metrics::metrics_handler;

use crate::errors::HrmError;
use crate::routes::AppState;
use crate::session::{CookiePersistence, SessionContext, SessionGuard};
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;

/// The session carried by one request's cookies.
pub struct RequestSession {
    cookies: Arc<CookiePersistence>,
    context: SessionContext,
}

impl RequestSession {
    pub fn new(state: &AppState, jar: CookieJar) -> Self {
        let cookies = Arc::new(CookiePersistence::new(jar, state.config.cookie_secure));
        let context = SessionContext::server(Arc::clone(&cookies), Arc::clone(&state.clock));
        Self { cookies, context }
    }

    pub fn guard(&self) -> &SessionGuard {
        self.context.guard()
    }

    /// The request's jar plus every cookie written or removed since.
    pub fn jar(&self) -> CookieJar {
        self.cookies.jar()
    }

    /// JSON body on success, the error otherwise; cookies go out either way.
    pub fn respond<T: Serialize>(&self, result: Result<T, HrmError>) -> Response {
        match result {
            Ok(body) => (self.jar(), Json(body)).into_response(),
            Err(e) => (self.jar(), e).into_response(),
        }
    }
}
