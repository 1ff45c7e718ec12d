//! Admin API mock
//!
//! Wraps a wiremock server with the admin API's endpoints and response
//! envelopes, plus record fixtures in the admin API's field names.

use hrm_portal::services::{auth, employees, lookups, workdays};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A running admin API double.
///
/// # Example
/// ```rust,ignore
/// let admin = AdminApiMock::start().await;
/// admin.login_succeeds(&token, 3600).await;
/// let server = TestPortalServer::spawn(&admin.uri()).await?;
/// ```
pub struct AdminApiMock {
    server: MockServer,
}

impl AdminApiMock {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// The underlying server, for custom mocks and request inspection.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Login returns `token`, valid for `expires_in` seconds.
    pub async fn login_succeeds(&self, token: &str, expires_in: u64) {
        Mock::given(method("POST"))
            .and(path(auth::LOGIN_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_entity(token, expires_in)))
            .mount(&self.server)
            .await;
    }

    /// Login is rejected with `message`.
    pub async fn login_fails(&self, message: &str) {
        Mock::given(method("POST"))
            .and(path(auth::LOGIN_ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "message": message})),
            )
            .mount(&self.server)
            .await;
    }

    /// Employee list returns `records` for requests bearing `token`.
    pub async fn employees_for(&self, token: &str, records: Vec<Value>) {
        Mock::given(method("POST"))
            .and(path(employees::LIST_ENDPOINT))
            .and(header("Authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": records })))
            .mount(&self.server)
            .await;
    }

    /// Work-day list returns `records` for requests bearing `token`.
    pub async fn work_days_for(&self, token: &str, records: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(workdays::LIST_ENDPOINT))
            .and(header("Authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": records })))
            .mount(&self.server)
            .await;
    }

    /// Lookup lists return `items`, expecting exactly `expected_calls`
    /// requests by the time the mock is dropped.
    pub async fn lookups_return(&self, items: Value, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(lookups::LOOKUP_ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "entity": items})),
            )
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Every request to `endpoint` is answered 401.
    pub async fn rejects_token_at(&self, endpoint: &str) {
        Mock::given(path(endpoint))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "message": "Token expired"
            })))
            .mount(&self.server)
            .await;
    }
}

/// Successful login body.
pub fn login_entity(token: &str, expires_in: u64) -> Value {
    json!({
        "success": true,
        "entity": {
            "token": token,
            "tokenRefresh": "refresh-token",
            "expiresIn": expires_in,
            "userId": "nv001",
            "email": "nv001@company.com",
            "fullName": "Nguyễn Văn A",
            "id": 1
        }
    })
}

/// Admin API customer record, as returned by the employee list.
pub fn employee_record(id: i64, code: &str, name: &str, department: &str) -> Value {
    json!({
        "id": id,
        "maKhachHang": code,
        "hoTenKhachHang": name,
        "email": format!("{}@company.com", code.to_lowercase()),
        "soDiDong": "0901234567",
        "chucVu": "Nhân viên",
        "ngheNghiep": department,
        "createdTime": "2024-03-15T08:30:00Z",
        "state": "A",
        "objStatus": 30
    })
}

/// Admin API work-day record with the same number of days every month.
pub fn work_days_record(id: i64, name: &str, department: &str, days_per_month: f64) -> Value {
    let mut record = json!({
        "id": id,
        "hoTenKhachHang": name,
        "phongBan": department,
    });
    for month in 1..=12 {
        record[format!("thang{month}")] = json!(days_per_month);
    }
    record
}

/// Combobox items.
pub fn lookup_items(pairs: &[(&str, &str)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(code, label)| json!({"maDanhMuc": code, "giaTriDanhMuc": label}))
            .collect(),
    )
}
