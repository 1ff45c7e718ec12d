//! Login, logout and session status.
//!
//! The session lives in cookies only; each handler returns the request's jar
//! so token cookies are set on login and removed on logout.

use super::RequestSession;
use crate::routes::AppState;
use crate::services::auth::{post_login_redirect, LoginRequest};
use crate::session::{SessionState, UserInfo};
use axum::{extract::State, response::Response, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub redirect_to: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub redirect_to: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub state: SessionState,
}

/// Handler for POST /auth/login
///
/// Sets the session cookies and answers with where to go next: `returnUrl`
/// if it is a local path, otherwise the employee list.
#[instrument(skip_all, name = "hrm.auth.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Response {
    let session = RequestSession::new(&state, jar);

    let result = state
        .auth
        .login(session.guard(), &request.username, &request.password)
        .await
        .map(|outcome| LoginResponse {
            redirect_to: post_login_redirect(request.return_url.as_deref()),
            user: outcome.user,
        });

    session.respond(result)
}

/// Handler for POST /auth/logout
///
/// Always succeeds, with or without a session.
#[instrument(skip_all, name = "hrm.auth.logout")]
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let session = RequestSession::new(&state, jar);
    let signal = session.guard().logout();

    session.respond(Ok(LogoutResponse {
        redirect_to: signal.redirect_to,
    }))
}

/// Handler for GET /auth/session
///
/// An expired session is reported once as `expired` and its cookies are
/// removed in the same response.
#[instrument(skip_all, name = "hrm.auth.session")]
pub async fn session_status(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let session = RequestSession::new(&state, jar);
    let current = session.guard().state();
    let authenticated = session.guard().is_authenticated();

    session.respond(Ok(SessionStatus {
        authenticated,
        state: current,
    }))
}
