//! `/api/employees` and `/api/workdays` integration tests.
//!
//! Covers the status contract: 401 without a bearer token, 403 for writes by
//! non-admins, 400 on missing fields, 404 on unknown IDs, 409 on duplicate
//! codes.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use hrm_test_utils::{AdminApiMock, TestPortalServer, TestTokenBuilder};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

struct Api {
    _admin: AdminApiMock,
    server: TestPortalServer,
    client: reqwest::Client,
}

impl Api {
    async fn start() -> Self {
        let admin = AdminApiMock::start().await;
        let server = TestPortalServer::spawn(&admin.uri()).await.unwrap();
        let client = server.client();
        Self {
            _admin: admin,
            server,
            client,
        }
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self
            .client
            .request(method, format!("{}{path}", self.server.url()));
        if let Some(authorization) = authorization {
            request = request.header("authorization", authorization);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        let body = response.json().await.unwrap_or(Value::Null);
        (status, body)
    }
}

fn admin_bearer() -> String {
    TestTokenBuilder::new().with_role("admin").bearer()
}

fn user_bearer() -> String {
    TestTokenBuilder::new().bearer()
}

fn new_employee(code: &str) -> Value {
    json!({
        "employeeCode": code,
        "fullName": "Nguyễn Văn A",
        "email": format!("{}@company.com", code.to_lowercase()),
        "phone": "0901234567",
        "position": "Kế toán viên",
        "department": "Kế toán",
        "hireDate": "2024-03-15",
        "salary": 15000000
    })
}

#[tokio::test]
async fn test_missing_or_malformed_bearer_is_401() -> Result<(), anyhow::Error> {
    let api = Api::start().await;

    let (status, _) = api.call(Method::GET, "/api/employees", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = api
        .call(Method::GET, "/api/employees", Some("Bearer not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = api
        .call(Method::GET, "/api/workdays", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_directory_starts_empty() -> Result<(), anyhow::Error> {
    let api = Api::start().await;

    let (status, body) = api
        .call(Method::GET, "/api/employees", Some(&user_bearer()), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    Ok(())
}

#[tokio::test]
async fn test_non_admin_writes_are_403() -> Result<(), anyhow::Error> {
    let api = Api::start().await;
    let user = user_bearer();

    let (status, _) = api
        .call(Method::POST, "/api/employees", Some(&user), Some(new_employee("NV001")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = api
        .call(Method::PUT, "/api/employees/1", Some(&user), Some(json!({"salary": 1})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = api
        .call(Method::DELETE, "/api/employees/1", Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_create_validates_required_fields() -> Result<(), anyhow::Error> {
    let api = Api::start().await;
    let mut body = new_employee("NV001");
    body["email"] = json!("");

    let (status, response) = api
        .call(Method::POST, "/api/employees", Some(&admin_bearer()), Some(body))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["message"], "Missing required field: email");

    Ok(())
}

#[tokio::test]
async fn test_employee_lifecycle() -> Result<(), anyhow::Error> {
    let api = Api::start().await;
    let admin = admin_bearer();

    let (status, first) = api
        .call(Method::POST, "/api/employees", Some(&admin), Some(new_employee("NV001")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["id"], 1);
    assert_eq!(first["status"], "active");

    let (status, second) = api
        .call(Method::POST, "/api/employees", Some(&admin), Some(new_employee("NV002")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["id"], 2);

    let (status, _) = api
        .call(Method::POST, "/api/employees", Some(&admin), Some(new_employee("NV001")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = api
        .call(
            Method::PUT,
            "/api/employees/2",
            Some(&admin),
            Some(json!({"id": 99, "department": "Công nghệ"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 2);
    assert_eq!(updated["department"], "Công nghệ");

    let (status, found) = api
        .call(Method::GET, "/api/employees?q=c%C3%B4ng", Some(&user_bearer()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, deleted) = api
        .call(Method::DELETE, "/api/employees/1", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Xóa nhân viên thành công");

    let (status, _) = api
        .call(Method::GET, "/api/employees/1", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_unknown_ids_are_404() -> Result<(), anyhow::Error> {
    let api = Api::start().await;
    let admin = admin_bearer();

    for (method, path) in [
        (Method::GET, "/api/employees/42"),
        (Method::GET, "/api/employees/abc"),
        (Method::DELETE, "/api/employees/42"),
    ] {
        let (status, _) = api.call(method, path, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
    }

    let (status, _) = api
        .call(Method::PUT, "/api/employees/42", Some(&admin), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_workdays_routes_are_501() -> Result<(), anyhow::Error> {
    let api = Api::start().await;
    let bearer = user_bearer();

    for (method, path) in [
        (Method::GET, "/api/workdays"),
        (Method::POST, "/api/workdays"),
        (Method::GET, "/api/workdays/1"),
        (Method::PUT, "/api/workdays/1"),
        (Method::DELETE, "/api/workdays/1"),
    ] {
        let (status, body) = api.call(method, path, Some(&bearer), None).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED, "{path}");
        assert_eq!(
            body["error"]["message"],
            "API endpoint not implemented. Use external API directly."
        );
    }

    Ok(())
}
