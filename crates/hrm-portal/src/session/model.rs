//! Session value types and storage key names.

use chrono::{DateTime, Utc};
use common::secret::SecretString;
use serde::{Deserialize, Serialize};

/// Lifetime assumed when the admin API does not report `expiresIn`.
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: u64 = 3600;

/// Lifetime of the refresh-token compatibility cookie.
pub const REFRESH_COOKIE_LIFETIME_SECONDS: u64 = 86_400;

/// A token is treated as expired this long before its real expiry.
pub const EXPIRY_BUFFER_SECONDS: i64 = 5 * 60;

/// Primary access token key (storage key and cookie name).
pub const AUTH_TOKEN_KEY: &str = "hrm_auth_token";

/// Refresh token key (storage key and cookie name).
pub const REFRESH_TOKEN_KEY: &str = "hrm_refresh_token";

/// Expiry marker key, epoch milliseconds.
pub const TOKEN_EXPIRY_KEY: &str = "hrm_token_expiry";

/// Stored user profile key (key/value store only).
pub const USER_INFO_KEY: &str = "userInfo";

/// Compatibility access token cookie.
pub const COMPAT_ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Compatibility refresh token cookie.
pub const COMPAT_REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Where a logged-out caller is sent.
pub const LOGIN_PATH: &str = "/login";

/// Persisted session credentials.
///
/// `expires_at == None` is a legal stored state (an old cookie without an
/// expiry marker) and is always treated as expired.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Expiry as epoch milliseconds, the stored representation.
    pub fn expires_at_millis(&self) -> Option<i64> {
        self.expires_at.map(|at| at.timestamp_millis())
    }
}

/// Parse a stored epoch-milliseconds expiry marker.
pub fn parse_expiry_marker(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

/// Profile of the logged-in user as returned by the login endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Expired,
    LoggedOut,
}

/// Why a session was ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// The user asked to log out.
    Requested,
    /// No usable token when one was required.
    SessionExpired,
    /// The admin API rejected the token with 401.
    UpstreamUnauthorized,
}

impl LogoutReason {
    pub fn as_str(self) -> &'static str {
        match self {
            LogoutReason::Requested => "requested",
            LogoutReason::SessionExpired => "session_expired",
            LogoutReason::UpstreamUnauthorized => "upstream_unauthorized",
        }
    }
}

/// Navigation instruction produced by a logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutSignal {
    pub redirect_to: String,
    pub reason: LogoutReason,
}

impl LogoutSignal {
    pub fn to_login(reason: LogoutReason) -> Self {
        Self {
            redirect_to: LOGIN_PATH.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_marker_roundtrips_millis() {
        let at = parse_expiry_marker("1750645243097").unwrap();
        assert_eq!(at.timestamp_millis(), 1_750_645_243_097);
    }

    #[test]
    fn test_expiry_marker_rejects_garbage() {
        assert!(parse_expiry_marker("").is_none());
        assert!(parse_expiry_marker("tomorrow").is_none());
    }

    #[test]
    fn test_user_info_uses_camel_case() {
        let info = UserInfo {
            user_id: Some("nv001".to_string()),
            email: None,
            full_name: Some("Nguyễn Văn A".to_string()),
            id: Some(7),
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["userId"], "nv001");
        assert_eq!(json["fullName"], "Nguyễn Văn A");
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_logout_signal_points_at_login() {
        let signal = LogoutSignal::to_login(LogoutReason::Requested);
        assert_eq!(signal.redirect_to, "/login");
        assert_eq!(signal.reason.as_str(), "requested");
    }
}
