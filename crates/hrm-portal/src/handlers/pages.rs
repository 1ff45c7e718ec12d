//! Page view models.
//!
//! Every page route sits behind the route filter, which has already decided
//! on the cookie's presence. Data pages then go to the admin API through the
//! session guard; if that ends the session the page answers with a redirect
//! to the login page and the session cookies removed.

use super::RequestSession;
use crate::errors::HrmError;
use crate::middleware::route_access::login_redirect;
use crate::models::{Employee, WorkDaysFilter, WorkDaysRow, WorkDaysStatistics};
use crate::routes::AppState;
use crate::services::{employees, workdays};
use crate::session::model::LOGIN_PATH;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPageQuery {
    #[serde(default)]
    pub return_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    pub page: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmployeesPageQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Serialize)]
pub struct EmployeesView {
    pub employees: Vec<Employee>,
    /// Every department in the unfiltered list, for the filter dropdown.
    pub departments: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct EmployeeView {
    pub employee: Employee,
}

#[derive(Debug, Serialize)]
pub struct WorkDaysView {
    pub rows: Vec<WorkDaysRow>,
    pub statistics: WorkDaysStatistics,
}

/// Answer a page: its view model, or on a lost session a redirect back to
/// this page through login.
fn page_response<T: Serialize>(
    session: &RequestSession,
    path: &str,
    result: Result<T, HrmError>,
) -> Response {
    match result {
        Err(e) if e.is_auth_failure() => {
            debug!(target: "hrm.handlers.pages", path = %path, "Session lost, redirecting to login");
            (session.jar(), Redirect::to(&login_redirect(path))).into_response()
        }
        other => session.respond(other),
    }
}

/// Handler for GET /
///
/// The route filter answers `/` itself; without a session this is where it
/// would send the caller too.
pub async fn root() -> Redirect {
    Redirect::to(LOGIN_PATH)
}

/// Handler for GET /login
#[instrument(skip_all, name = "hrm.pages.login")]
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Json<LoginView> {
    Json(LoginView {
        page: "login",
        return_url: query.return_url.filter(|u| !u.is_empty()),
    })
}

/// Handler for GET /employees
///
/// `q` matches name, email or code; `department` is an exact match.
#[instrument(skip_all, name = "hrm.pages.employees")]
pub async fn employees_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<EmployeesPageQuery>,
) -> Response {
    let session = RequestSession::new(&state, jar);

    let result = state
        .employees
        .list(session.guard(), None, None)
        .await
        .map(|all| {
            let matching: Vec<Employee> =
                employees::filter_employees(&all, query.q.trim(), &query.department)
                    .into_iter()
                    .cloned()
                    .collect();
            EmployeesView {
                total: matching.len(),
                departments: employees::departments(&all),
                employees: matching,
            }
        });

    page_response(&session, "/employees", result)
}

/// Handler for GET /employees/:id
#[instrument(skip_all, name = "hrm.pages.employee", fields(employee_id = %id))]
pub async fn employee_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let session = RequestSession::new(&state, jar);
    let path = format!("/employees/{id}");

    let result = match id.parse::<i64>() {
        Ok(id) => state
            .employees
            .get(session.guard(), id)
            .await
            .map(|employee| EmployeeView { employee }),
        Err(_) => Err(HrmError::NotFound(format!(
            "Không tìm thấy nhân viên có ID: {id}"
        ))),
    };

    page_response(&session, &path, result)
}

/// Handler for GET /workdays
///
/// Without filter parameters every row is listed; with any, the admin API
/// filters.
#[instrument(skip_all, name = "hrm.pages.workdays")]
pub async fn workdays_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(filter): Query<WorkDaysFilter>,
) -> Response {
    let session = RequestSession::new(&state, jar);

    let rows = if filter == WorkDaysFilter::default() {
        state.workdays.list(session.guard()).await
    } else {
        state.workdays.filter(session.guard(), &filter).await
    };
    let result = rows.map(|rows| WorkDaysView {
        statistics: workdays::statistics(&rows),
        rows,
    });

    page_response(&session, "/workdays", result)
}

/// Handler for GET /leaves, /salary and /api-test
pub async fn placeholder_page() -> HrmError {
    HrmError::NotImplemented("Trang đang được phát triển".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_login_page_echoes_return_url() {
        let Json(view) = login_page(Query(LoginPageQuery {
            return_url: Some("/workdays".to_string()),
        }))
        .await;

        assert_eq!(view.page, "login");
        assert_eq!(view.return_url.as_deref(), Some("/workdays"));
    }

    #[tokio::test]
    async fn test_login_page_drops_empty_return_url() {
        let Json(view) = login_page(Query(LoginPageQuery {
            return_url: Some(String::new()),
        }))
        .await;

        assert!(view.return_url.is_none());
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            serde_json::json!({"page": "login"})
        );
    }

    #[tokio::test]
    async fn test_placeholder_pages_are_501() {
        let response = placeholder_page().await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
