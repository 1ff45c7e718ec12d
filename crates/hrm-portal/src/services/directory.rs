//! In-process employee directory behind `/api/employees`.
//!
//! Records live for the process lifetime. IDs are assigned as one more than
//! the largest ID present (1 for an empty directory); employee codes are
//! unique.

use crate::errors::HrmError;
use crate::models::{Employee, EmployeeCreateRequest, EmployeeStatus, EmployeeUpdateRequest};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const NOT_FOUND_MESSAGE: &str = "Không tìm thấy nhân viên";
pub const DUPLICATE_CODE_MESSAGE: &str = "Mã nhân viên đã tồn tại";

#[derive(Debug, Clone, Default)]
pub struct EmployeeDirectory {
    employees: Arc<RwLock<Vec<Employee>>>,
}

impl EmployeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory pre-populated with `employees`.
    pub fn with_employees(employees: Vec<Employee>) -> Self {
        Self {
            employees: Arc::new(RwLock::new(employees)),
        }
    }

    /// All employees, or those whose name, code, email or department
    /// contains `query` (case-insensitive).
    pub async fn list(&self, query: Option<&str>) -> Vec<Employee> {
        let employees = self.employees.read().await;
        match query.filter(|q| !q.is_empty()) {
            None => employees.clone(),
            Some(query) => {
                let needle = query.to_lowercase();
                employees
                    .iter()
                    .filter(|e| {
                        [&e.full_name, &e.employee_code, &e.email, &e.department]
                            .iter()
                            .any(|field| field.to_lowercase().contains(&needle))
                    })
                    .cloned()
                    .collect()
            }
        }
    }

    /// # Errors
    ///
    /// `NotFound` if no employee has `id`.
    pub async fn get(&self, id: i64) -> Result<Employee, HrmError> {
        self.employees
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| HrmError::NotFound(NOT_FOUND_MESSAGE.to_string()))
    }

    /// Add a new active employee.
    ///
    /// # Errors
    ///
    /// `Conflict` if the employee code is taken.
    pub async fn create(&self, request: EmployeeCreateRequest) -> Result<Employee, HrmError> {
        let mut employees = self.employees.write().await;

        if employees
            .iter()
            .any(|e| e.employee_code == request.employee_code)
        {
            return Err(HrmError::Conflict(DUPLICATE_CODE_MESSAGE.to_string()));
        }

        let id = employees.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let employee = Employee {
            id,
            employee_code: request.employee_code,
            full_name: request.full_name,
            email: request.email,
            phone: request.phone,
            position: request.position,
            department: request.department,
            hire_date: request.hire_date,
            salary: request.salary,
            status: EmployeeStatus::Active,
            avatar: request.avatar,
        };
        employees.push(employee.clone());

        info!(target: "hrm.services.directory", employee_id = id, "Employee created");
        Ok(employee)
    }

    /// Merge `request` into the employee. The ID never changes.
    ///
    /// # Errors
    ///
    /// `NotFound` if no employee has `id`.
    pub async fn update(&self, id: i64, request: EmployeeUpdateRequest) -> Result<Employee, HrmError> {
        let mut employees = self.employees.write().await;
        let employee = employees
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| HrmError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

        request.apply_to(employee);
        employee.id = id;

        debug!(target: "hrm.services.directory", employee_id = id, "Employee updated");
        Ok(employee.clone())
    }

    /// # Errors
    ///
    /// `NotFound` if no employee has `id`.
    pub async fn delete(&self, id: i64) -> Result<(), HrmError> {
        let mut employees = self.employees.write().await;
        let position = employees
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| HrmError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;
        employees.remove(position);

        info!(target: "hrm.services.directory", employee_id = id, "Employee deleted");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.employees.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.employees.read().await.is_empty()
    }
}
