//! Page route gate.
//!
//! Runs before every page handler and decides on the session cookie alone:
//!
//! | path | cookie | result |
//! |------|--------|--------|
//! | private | absent | 303 to `/login?returnUrl=<path>` |
//! | `/login` | present | 303 to the landing page |
//! | `/` | present | 303 to the landing page |
//! | `/` | absent | 303 to `/login` |
//! | anything else | any | passed through |
//!
//! By default only the cookie's presence counts. With `check_expiry` the
//! expiry marker cookie must also be present and not within the expiry
//! buffer; the token itself is still not inspected. Handlers that call the
//! admin API validate it through the session guard.

use crate::session::model::{parse_expiry_marker, AUTH_TOKEN_KEY, LOGIN_PATH, TOKEN_EXPIRY_KEY};
use crate::session::TokenValidator;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use common::clock::Clock;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::form_urlencoded;

/// Pages that need a session. `[param]` and `:param` segments match one
/// non-empty path segment.
pub const PRIVATE_ROUTES: [&str; 6] = [
    "/employees",
    "/employees/[id]",
    "/workdays",
    "/leaves",
    "/salary",
    "/api-test",
];

/// Pages a logged-in user is sent away from.
pub const AUTH_ROUTES: [&str; 1] = [LOGIN_PATH];

/// Where authenticated users land.
pub const LANDING_PATH: &str = "/employees";

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(String),
}

#[derive(Debug, Clone)]
pub struct RouteAccessState {
    pub check_expiry: bool,
    pub clock: Arc<dyn Clock>,
    pub validator: TokenValidator,
}

impl RouteAccessState {
    pub fn new(check_expiry: bool, clock: Arc<dyn Clock>) -> Self {
        Self {
            check_expiry,
            clock,
            validator: TokenValidator::default(),
        }
    }

    /// Whether `jar` carries a session for the purpose of the gate.
    pub fn has_session(&self, jar: &CookieJar) -> bool {
        let token_present = jar
            .get(AUTH_TOKEN_KEY)
            .is_some_and(|c| !c.value().is_empty());
        if !token_present || !self.check_expiry {
            return token_present;
        }

        let expires_at = jar
            .get(TOKEN_EXPIRY_KEY)
            .and_then(|c| parse_expiry_marker(c.value()));
        !self.validator.is_expired(expires_at, self.clock.now())
    }
}

/// Match `path` against a route pattern.
fn matches_route(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) => {
                let is_param = (p.starts_with('[') && p.ends_with(']') && p.len() > 2)
                    || (p.starts_with(':') && p.len() > 1);
                let segment_ok = if is_param { !s.is_empty() } else { p == s };
                if !segment_ok {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

pub fn is_private(path: &str) -> bool {
    PRIVATE_ROUTES.iter().any(|pattern| matches_route(pattern, path))
}

pub fn is_auth_page(path: &str) -> bool {
    AUTH_ROUTES.contains(&path)
}

/// `/login?returnUrl=<path>`, percent-encoded.
pub fn login_redirect(return_to: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("returnUrl", return_to)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

/// Decide access for `path` given whether a session cookie is present.
pub fn decide(path: &str, has_session: bool) -> Access {
    if is_private(path) && !has_session {
        return Access::Redirect(login_redirect(path));
    }
    if is_auth_page(path) && has_session {
        return Access::Redirect(LANDING_PATH.to_string());
    }
    if path == "/" {
        let target = if has_session { LANDING_PATH } else { LOGIN_PATH };
        return Access::Redirect(target.to_string());
    }
    Access::Allow
}

/// Route filter middleware for page routes.
#[instrument(skip_all, name = "hrm.middleware.route_access")]
pub async fn route_access(
    State(state): State<RouteAccessState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    match decide(&path, state.has_session(&jar)) {
        Access::Allow => next.run(req).await,
        Access::Redirect(location) => {
            debug!(target: "hrm.middleware.route_access", path = %path, location = %location, "Redirecting");
            Redirect::to(&location).into_response()
        }
    }
}
