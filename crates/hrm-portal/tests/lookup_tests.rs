//! Lookup proxy integration tests.
//!
//! `/api/lookups/:param_type` serves combobox lists from the shared cache,
//! for callers with a session cookie only.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use hrm_portal::services::lookups::LOOKUP_ENDPOINT;
use hrm_test_utils::{cookie_header, lookup_items, AdminApiMock, TestPortalServer, TestTokenBuilder};
use serde_json::{json, Value};

async fn login(server: &TestPortalServer) -> String {
    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&json!({"username": "nv001", "password": "secret"}))
        .send()
        .await
        .unwrap();
    cookie_header(&response)
}

#[tokio::test]
async fn test_lookup_is_fetched_once_across_sessions() -> Result<(), anyhow::Error> {
    let admin = AdminApiMock::start().await;
    admin
        .login_succeeds(&TestTokenBuilder::new().build(), 3600)
        .await;
    admin
        .lookups_return(lookup_items(&[("KT", "Kế toán"), ("CN", "Công nghệ")]), 1)
        .await;
    let server = TestPortalServer::spawn(&admin.uri()).await?;
    let first = login(&server).await;
    let second = login(&server).await;

    for cookies in [&first, &second, &first] {
        let response = server
            .client()
            .get(format!("{}/api/lookups/PHONGBAN", server.url()))
            .header("cookie", cookies)
            .send()
            .await?;
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await?;
        assert_eq!(body[0]["maDanhMuc"], "KT");
        assert_eq!(body[1]["giaTriDanhMuc"], "Công nghệ");
    }

    Ok(())
}

#[tokio::test]
async fn test_parameters_reach_the_admin_api() -> Result<(), anyhow::Error> {
    let admin = AdminApiMock::start().await;
    admin
        .login_succeeds(&TestTokenBuilder::new().build(), 3600)
        .await;
    admin.lookups_return(lookup_items(&[("X", "Y")]), 1).await;
    let server = TestPortalServer::spawn(&admin.uri()).await?;
    let cookies = login(&server).await;

    let response = server
        .client()
        .get(format!(
            "{}/api/lookups/SANPHAM?paramCode=QUY&userId=HR01",
            server.url()
        ))
        .header("cookie", &cookies)
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let requests = admin.server().received_requests().await.unwrap();
    let lookup = requests
        .iter()
        .find(|r| r.url.path() == LOOKUP_ENDPOINT)
        .unwrap();
    let sent: Value = serde_json::from_slice(&lookup.body)?;
    assert_eq!(
        sent,
        json!({"ParamType": "SANPHAM", "ParamCode": "QUY", "UserId": "HR01"})
    );

    Ok(())
}

#[tokio::test]
async fn test_lookup_without_session_is_401_and_not_fetched() -> Result<(), anyhow::Error> {
    let admin = AdminApiMock::start().await;
    admin.lookups_return(lookup_items(&[("KT", "Kế toán")]), 0).await;
    let server = TestPortalServer::spawn(&admin.uri()).await?;

    let response = reqwest::get(format!("{}/api/lookups/PHONGBAN", server.url())).await?;

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "SESSION_EXPIRED");

    Ok(())
}
