//! Login against the admin API.

use super::admin_client::AdminClient;
use crate::errors::HrmError;
use crate::session::{Session, SessionGuard, UserInfo};
use common::secret::{ExposeSecret, SecretString};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

pub const LOGIN_ENDPOINT: &str = "/admin/AdminUser/LoginGenerateAuthentication";

/// Message shown when the admin API rejects credentials without a reason.
pub const DEFAULT_LOGIN_FAILURE: &str = "Tên đăng nhập hoặc mật khẩu không đúng";

/// Login form body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
    /// Page to continue to after login.
    #[serde(default)]
    pub return_url: Option<String>,
}

/// A session established by [`AuthService::login`].
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: Session,
    pub user: UserInfo,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    admin: AdminClient,
}

impl AuthService {
    pub fn new(admin: AdminClient) -> Self {
        Self { admin }
    }

    /// Exchange credentials for a token and store it in `session`.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` with the admin API's message (or a default) when the
    ///   credentials are rejected
    /// - `Upstream` when the admin API fails with 5xx
    /// - transport errors as-is
    #[instrument(skip_all, name = "hrm.services.auth.login")]
    pub async fn login(
        &self,
        session: &SessionGuard,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, HrmError> {
        let body = json!({
            "loginType": 1,
            "userName": username,
            "password": password.expose_secret(),
        });

        let response = self
            .admin
            .send("login", Method::POST, LOGIN_ENDPOINT, None, Some(&body))
            .await?;

        if response.status.is_server_error() {
            return match response.into_result() {
                Err(e) => Err(e),
                Ok(_) => Err(HrmError::Internal("Login failed".to_string())),
            };
        }

        let success = response.status.is_success()
            && response.body.get("success").and_then(Value::as_bool) == Some(true);
        let entity = response.body.get("entity");
        let token = entity
            .and_then(|e| e.get("token"))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());

        let (Some(entity), Some(token), true) = (entity, token, success) else {
            warn!(target: "hrm.services.auth", status = %response.status, "Login rejected");
            return Err(HrmError::Unauthorized(
                response
                    .message()
                    .unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_string()),
            ));
        };

        let refresh_token = entity
            .get("tokenRefresh")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());
        let expires_in = entity.get("expiresIn").and_then(Value::as_u64);

        let stored = session
            .store()
            .set_token(token, refresh_token, expires_in)?;

        let user = user_info(entity);
        session.store().set_user_info(&user);

        info!(target: "hrm.services.auth", "Login succeeded");
        Ok(LoginOutcome {
            session: stored,
            user,
        })
    }
}

/// Profile fields of the login entity. The admin API is inconsistent about
/// whether `userId` is a string or a number.
fn user_info(entity: &Value) -> UserInfo {
    let text = |key: &str| match entity.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    UserInfo {
        user_id: text("userId"),
        email: text("email"),
        full_name: text("fullName"),
        id: entity.get("id").and_then(Value::as_i64),
    }
}

/// Where to go after login: `return_url` if it is a local path, else the
/// landing page.
pub fn post_login_redirect(return_url: Option<&str>) -> String {
    match return_url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') => {
            url.to_string()
        }
        _ => crate::middleware::route_access::LANDING_PATH.to_string(),
    }
}
