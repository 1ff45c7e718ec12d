//! Bearer authentication for the portal's own JSON routes.
//!
//! Extracts the Bearer token from the Authorization header, checks that it
//! is structurally a token, and injects the [`Caller`] into request
//! extensions. The token's signature is not verified here; the caller's role
//! is read from the unverified `role` claim and only gates writes to the
//! in-process directory.

use crate::errors::HrmError;
use axum::{extract::Request, middleware::Next, response::Response};
use common::token;
use tracing::{debug, instrument};

/// Role assumed when the token carries none.
pub const DEFAULT_ROLE: &str = "user";

/// Role allowed to modify records.
pub const ADMIN_ROLE: &str = "admin";

/// The authenticated caller of a JSON route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// `sub` claim, if any.
    pub subject: Option<String>,
    pub role: String,
}

impl Caller {
    /// Caller described by `token`'s payload.
    pub fn from_token(token: &str) -> Self {
        Self {
            subject: token::peek_claim(token, "sub"),
            role: token::peek_claim(token, "role").unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        }
    }

    /// # Errors
    ///
    /// `Forbidden` unless the caller holds one of `roles`.
    pub fn require_role(&self, roles: &[&str]) -> Result<(), HrmError> {
        if roles.contains(&self.role.as_str()) {
            Ok(())
        } else {
            debug!(target: "hrm.middleware.auth", role = %self.role, "Role not permitted");
            Err(HrmError::Forbidden("Insufficient permissions".to_string()))
        }
    }

    /// # Errors
    ///
    /// `Forbidden` unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), HrmError> {
        self.require_role(&[ADMIN_ROLE])
    }
}

/// Authentication middleware for the JSON routes.
///
/// # Authorization Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Response
///
/// - 401 with WWW-Authenticate if the header is missing, not a Bearer
///   value, or the token is malformed
/// - otherwise continues with the [`Caller`] in extensions
#[instrument(skip_all, name = "hrm.middleware.auth")]
pub async fn require_bearer(mut req: Request, next: Next) -> Result<Response, HrmError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            debug!(target: "hrm.middleware.auth", "Missing Authorization header");
            HrmError::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;

    let bearer = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        debug!(target: "hrm.middleware.auth", "Invalid Authorization header format");
        HrmError::Unauthorized("Missing or invalid Authorization header".to_string())
    })?;

    if let Err(e) = token::check_format(bearer) {
        debug!(target: "hrm.middleware.auth", reason = ?e, "Malformed bearer token");
        return Err(HrmError::Unauthorized("Invalid or expired token".to_string()));
    }

    let caller = Caller::from_token(bearer);
    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
