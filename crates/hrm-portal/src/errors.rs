//! HRM portal error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. Upstream
//! messages are passed through to the caller when the admin API supplied
//! one; internal details are logged server-side and replaced with a generic
//! message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// HRM portal error type.
///
/// Maps to HTTP status codes:
/// - InvalidArgument, BadRequest: 400 Bad Request
/// - SessionExpired, Unauthorized: 401 Unauthorized
/// - Forbidden: 403 Forbidden
/// - NotFound: 404 Not Found
/// - Conflict: 409 Conflict
/// - Internal: 500 Internal Server Error
/// - NotImplemented: 501 Not Implemented
/// - Upstream: 502 Bad Gateway
/// - ServiceUnavailable: 503 Service Unavailable
/// - UpstreamTimeout: 504 Gateway Timeout
///
/// `Clone` so that a single failed fetch can be handed to every caller that
/// was waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HrmError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Upstream request timed out")]
    UpstreamTimeout,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl HrmError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            HrmError::InvalidArgument(_) | HrmError::BadRequest(_) => 400,
            HrmError::SessionExpired | HrmError::Unauthorized(_) => 401,
            HrmError::Forbidden(_) => 403,
            HrmError::NotFound(_) => 404,
            HrmError::Conflict(_) => 409,
            HrmError::Internal(_) => 500,
            HrmError::NotImplemented(_) => 501,
            HrmError::Upstream { .. } => 502,
            HrmError::ServiceUnavailable(_) => 503,
            HrmError::UpstreamTimeout => 504,
        }
    }

    /// Whether this error means the caller's session is no longer usable.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, HrmError::SessionExpired | HrmError::Unauthorized(_))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for HrmError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            HrmError::InvalidArgument(reason) => {
                (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", reason.clone())
            }
            HrmError::BadRequest(reason) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone()),
            HrmError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                "SESSION_EXPIRED",
                "Phiên đăng nhập đã hết hạn. Vui lòng đăng nhập lại.".to_string(),
            ),
            HrmError::Unauthorized(reason) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", reason.clone())
            }
            HrmError::Forbidden(reason) => (StatusCode::FORBIDDEN, "FORBIDDEN", reason.clone()),
            HrmError::NotFound(resource) => (StatusCode::NOT_FOUND, "NOT_FOUND", resource.clone()),
            HrmError::Conflict(reason) => (StatusCode::CONFLICT, "CONFLICT", reason.clone()),
            HrmError::Upstream { status, message } => {
                tracing::warn!(target: "hrm.upstream", upstream_status = status, message = %message, "Admin API returned an error");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message.clone())
            }
            HrmError::UpstreamTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "UPSTREAM_TIMEOUT",
                "The admin API did not respond in time".to_string(),
            ),
            HrmError::ServiceUnavailable(reason) => {
                // Log actual reason server-side
                tracing::warn!(target: "hrm.availability", reason = %reason, "Service unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                )
            }
            HrmError::NotImplemented(what) => {
                (StatusCode::NOT_IMPLEMENTED, "NOT_IMPLEMENTED", what.clone())
            }
            HrmError::Internal(err) => {
                tracing::error!(target: "hrm.internal", error = %err, "Unexpected failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) = "Bearer realm=\"hrm-portal\", error=\"invalid_token\"".parse()
            {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

impl From<reqwest::Error> for HrmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HrmError::UpstreamTimeout
        } else if err.is_connect() {
            HrmError::ServiceUnavailable(format!("Admin API unreachable: {err}"))
        } else {
            HrmError::Internal(format!("Admin API request failed: {err}"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_display_upstream() {
        let error = HrmError::Upstream {
            status: 500,
            message: "Lỗi API: 500".to_string(),
        };
        assert_eq!(format!("{error}"), "Upstream error (500): Lỗi API: 500");
    }

    #[test]
    fn test_display_session_expired() {
        assert_eq!(format!("{}", HrmError::SessionExpired), "Session expired");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(HrmError::InvalidArgument("t".to_string()).status_code(), 400);
        assert_eq!(HrmError::BadRequest("t".to_string()).status_code(), 400);
        assert_eq!(HrmError::SessionExpired.status_code(), 401);
        assert_eq!(HrmError::Unauthorized("t".to_string()).status_code(), 401);
        assert_eq!(HrmError::Forbidden("t".to_string()).status_code(), 403);
        assert_eq!(HrmError::NotFound("t".to_string()).status_code(), 404);
        assert_eq!(HrmError::Conflict("t".to_string()).status_code(), 409);
        assert_eq!(HrmError::Internal("t".to_string()).status_code(), 500);
        assert_eq!(HrmError::NotImplemented("t".to_string()).status_code(), 501);
        assert_eq!(
            HrmError::Upstream {
                status: 418,
                message: "t".to_string()
            }
            .status_code(),
            502
        );
        assert_eq!(
            HrmError::ServiceUnavailable("t".to_string()).status_code(),
            503
        );
        assert_eq!(HrmError::UpstreamTimeout.status_code(), 504);
    }

    #[test]
    fn test_is_auth_failure() {
        assert!(HrmError::SessionExpired.is_auth_failure());
        assert!(HrmError::Unauthorized("401".to_string()).is_auth_failure());
        assert!(!HrmError::Forbidden("role".to_string()).is_auth_failure());
        assert!(!HrmError::UpstreamTimeout.is_auth_failure());
    }

    #[tokio::test]
    async fn test_into_response_session_expired_has_www_authenticate() {
        let response = HrmError::SessionExpired.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let www_auth = response
            .headers()
            .get("WWW-Authenticate")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(www_auth.contains("Bearer realm=\"hrm-portal\""));

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "SESSION_EXPIRED");
    }

    #[tokio::test]
    async fn test_into_response_upstream_passes_message_through() {
        let error = HrmError::Upstream {
            status: 400,
            message: "Mã khách hàng không hợp lệ".to_string(),
        };
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "UPSTREAM_ERROR");
        assert_eq!(body_json["error"]["message"], "Mã khách hàng không hợp lệ");
    }

    #[tokio::test]
    async fn test_into_response_conflict() {
        let response = HrmError::Conflict("Mã nhân viên đã tồn tại".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "CONFLICT");
        assert_eq!(body_json["error"]["message"], "Mã nhân viên đã tồn tại");
    }

    #[tokio::test]
    async fn test_into_response_not_implemented() {
        let response = HrmError::NotImplemented("workdays".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "NOT_IMPLEMENTED");
    }

    #[tokio::test]
    async fn test_into_response_internal_hides_details() {
        let response = HrmError::Internal("serde blew up at line 3".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body_json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_into_response_service_unavailable_is_generic() {
        let response =
            HrmError::ServiceUnavailable("connection refused".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(
            body_json["error"]["message"],
            "Service temporarily unavailable"
        );
    }

    #[tokio::test]
    async fn test_into_response_forbidden_has_no_www_authenticate() {
        let response = HrmError::Forbidden("admin only".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get("WWW-Authenticate").is_none());
    }
}
