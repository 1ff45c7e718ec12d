//! `/api/employees` over the in-process directory.
//!
//! All routes sit behind bearer authentication; writes additionally need
//! the admin role.

use crate::errors::HrmError;
use crate::middleware::Caller;
use crate::models::{Employee, EmployeeCreateRequest, EmployeeUpdateRequest};
use crate::routes::AppState;
use crate::services::directory::NOT_FOUND_MESSAGE;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Path IDs that are not integers name no employee.
fn parse_id(raw: &str) -> Result<i64, HrmError> {
    raw.parse()
        .map_err(|_| HrmError::NotFound(NOT_FOUND_MESSAGE.to_string()))
}

/// Handler for GET /api/employees
#[instrument(skip_all, name = "hrm.api.employees.list")]
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Employee>> {
    Json(state.directory.list(query.q.as_deref()).await)
}

/// Handler for POST /api/employees
///
/// # Response
///
/// - 201 Created with the stored employee
/// - 400 if a required field is missing
/// - 403 unless the caller is an admin
/// - 409 if the employee code is taken
#[instrument(skip_all, name = "hrm.api.employees.create")]
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Employee>), HrmError> {
    caller.require_admin()?;
    let request = EmployeeCreateRequest::from_json(&body)?;

    let employee = state.directory.create(request).await?;
    info!(target: "hrm.api.employees", employee_id = employee.id, "Employee created");

    Ok((StatusCode::CREATED, Json(employee)))
}

/// Handler for GET /api/employees/:id
#[instrument(skip_all, name = "hrm.api.employees.get", fields(employee_id = %id))]
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Employee>, HrmError> {
    let id = parse_id(&id)?;
    Ok(Json(state.directory.get(id).await?))
}

/// Handler for PUT /api/employees/:id
#[instrument(skip_all, name = "hrm.api.employees.update", fields(employee_id = %id))]
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(request): Json<EmployeeUpdateRequest>,
) -> Result<Json<Employee>, HrmError> {
    caller.require_admin()?;
    let id = parse_id(&id)?;

    let employee = state.directory.update(id, request).await?;
    info!(target: "hrm.api.employees", employee_id = id, "Employee updated");

    Ok(Json(employee))
}

/// Handler for DELETE /api/employees/:id
#[instrument(skip_all, name = "hrm.api.employees.delete", fields(employee_id = %id))]
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, HrmError> {
    caller.require_admin()?;
    let id = parse_id(&id)?;

    state.directory.delete(id).await?;
    info!(target: "hrm.api.employees", employee_id = id, "Employee deleted");

    Ok(Json(MessageResponse {
        message: "Xóa nhân viên thành công".to_string(),
    }))
}
