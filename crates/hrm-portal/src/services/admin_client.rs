//! HTTP client for the external admin API.
//!
//! Every call sends `Content-Type: application/json` and
//! `Accept: application/json`; authenticated calls add the caller's
//! `Authorization: Bearer` value. Status handling:
//!
//! - 2xx: the JSON body (`null` when empty)
//! - 401: `HrmError::Unauthorized`, which [`AdminClient::call`] routes
//!   through the session guard so the rejected token is purged
//! - other: `HrmError::Upstream` with the body's `message`, or
//!   `Lỗi API: {status}`

use crate::errors::HrmError;
use crate::observability::metrics;
use crate::session::SessionGuard;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{error, warn};

/// Connect timeout for admin API requests.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Message used when the admin API rejects a bearer token without saying why.
const SESSION_EXPIRED_MESSAGE: &str = "Phiên đăng nhập đã hết hạn. Vui lòng đăng nhập lại";

/// Raw admin API reply, before status mapping.
#[derive(Debug, Clone)]
pub struct AdminResponse {
    pub status: StatusCode,
    /// Parsed body; `null` when empty or, for error statuses, not JSON.
    pub body: Value,
}

impl AdminResponse {
    /// The body's `message` field, if it is a non-empty string.
    pub fn message(&self) -> Option<String> {
        upstream_message(&self.body)
    }

    /// Map the status to the body or an error.
    ///
    /// # Errors
    ///
    /// `Unauthorized` on 401, `Upstream` on any other non-2xx status.
    pub fn into_result(self) -> Result<Value, HrmError> {
        if self.status.is_success() {
            return Ok(self.body);
        }

        let message = self.message();
        if self.status == StatusCode::UNAUTHORIZED {
            return Err(HrmError::Unauthorized(
                message.unwrap_or_else(|| SESSION_EXPIRED_MESSAGE.to_string()),
            ));
        }

        Err(HrmError::Upstream {
            status: self.status.as_u16(),
            message: message.unwrap_or_else(|| format!("Lỗi API: {}", self.status.as_u16())),
        })
    }
}

/// HTTP client for the admin API.
#[derive(Debug, Clone)]
pub struct AdminClient {
    /// HTTP client with configured timeouts.
    client: Client,

    /// Base URL without a trailing slash.
    base_url: String,
}

impl AdminClient {
    /// Create a new admin API client.
    ///
    /// # Errors
    ///
    /// Returns `HrmError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HrmError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                error!(target: "hrm.services.admin", error = %e, "Failed to build HTTP client");
                HrmError::Internal(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and return the raw status and body.
    ///
    /// # Errors
    ///
    /// Transport failures (`UpstreamTimeout`, `ServiceUnavailable`), or
    /// `Internal` if a 2xx body is not JSON.
    pub async fn send(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        authorization: Option<&str>,
        body: Option<&Value>,
    ) -> Result<AdminResponse, HrmError> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let mut request = self
            .client
            .request(method, &url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");
        if let Some(value) = authorization {
            request = request.header("Authorization", value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let outcome = if e.is_timeout() { "timeout" } else { "error" };
            metrics::record_upstream_request(operation, outcome, start.elapsed());
            warn!(target: "hrm.services.admin", operation, error = %e, "Admin API request failed");
            HrmError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            let outcome = if e.is_timeout() { "timeout" } else { "error" };
            metrics::record_upstream_request(operation, outcome, start.elapsed());
            warn!(target: "hrm.services.admin", operation, error = %e, "Failed to read admin API response");
            HrmError::from(e)
        })?;
        metrics::record_upstream_request(operation, status.as_str(), start.elapsed());

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) if status.is_success() => {
                    error!(target: "hrm.services.admin", operation, error = %e, "Failed to parse admin API response");
                    return Err(HrmError::Internal(format!(
                        "Invalid admin API response for {operation}"
                    )));
                }
                Err(_) => Value::Null,
            }
        };

        if !status.is_success() {
            warn!(target: "hrm.services.admin", operation, status = %status, "Admin API returned error status");
        }

        Ok(AdminResponse { status, body })
    }

    /// [`send`](Self::send) followed by status mapping.
    ///
    /// # Errors
    ///
    /// See [`AdminResponse::into_result`].
    pub async fn send_json(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        authorization: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value, HrmError> {
        self.send(operation, method, path, authorization, body)
            .await?
            .into_result()
    }

    /// Authenticated call on behalf of `session`.
    ///
    /// A missing or expired session fails with `SessionExpired` before any
    /// request is made. A 401 from the admin API logs the session out.
    ///
    /// # Errors
    ///
    /// `SessionExpired`, `Unauthorized`, `Upstream`, or a transport error.
    pub async fn call(
        &self,
        session: &SessionGuard,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, HrmError> {
        let authorization = session.require_authorization_header()?;
        self.send_json(operation, method, path, Some(&authorization), body)
            .await
            .map_err(|e| session.observe(e))
    }
}

/// `message` field of an admin API body.
pub fn upstream_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Record list of a list response: `.items`, then `.data`, then a bare
/// array. Any other shape reads as empty.
pub fn extract_items(body: &Value) -> Vec<Value> {
    if let Some(items) = body.get("items").and_then(Value::as_array) {
        return items.clone();
    }
    if let Some(data) = body.get("data").and_then(Value::as_array) {
        return data.clone();
    }
    if let Some(items) = body.as_array() {
        return items.clone();
    }

    warn!(target: "hrm.services.admin", "Admin API response has no item list, treating as empty");
    Vec::new()
}
