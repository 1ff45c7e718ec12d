//! Health check handler.
//!
//! Liveness only: the admin API is not probed, so an upstream outage does
//! not take the portal out of rotation.

use crate::models::HealthResponse;
use axum::Json;
use tracing::instrument;

/// Health check handler.
///
/// ## Example Response
///
/// ```json
/// { "status": "healthy" }
/// ```
#[instrument(skip_all, name = "hrm.health.check")]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_reports_healthy() {
        let Json(response) = health_check().await;
        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"status":"healthy"}"#);
    }
}
