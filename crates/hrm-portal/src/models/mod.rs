//! HRM portal models.
//!
//! Domain records mapped from admin API responses, request/response bodies
//! of the portal's own endpoints, and lookup list items.

use crate::errors::HrmError;
use crate::mapping::{employee, is_truthy, work_days, RecordContext};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Health check response.
///
/// Returned by the `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status ("healthy").
    pub status: String,
}

// ============================================================================
// Employee
// ============================================================================

/// Employment status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

impl EmployeeStatus {
    /// The admin API marks an active customer record with state "A" and
    /// object status 30.
    fn from_admin(record: &Value) -> Self {
        let state_active = record.get("state").and_then(Value::as_str) == Some("A");
        let obj_active = record.get("objStatus").and_then(Value::as_i64) == Some(30);
        if state_active && obj_active {
            EmployeeStatus::Active
        } else {
            EmployeeStatus::Inactive
        }
    }
}

/// An employee as shown by the portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Admin API record ID, or the 1-based list position if it has none.
    pub id: i64,

    pub employee_code: String,

    pub full_name: String,

    pub email: String,

    pub phone: String,

    pub position: String,

    pub department: String,

    /// `YYYY-MM-DD`.
    pub hire_date: String,

    pub salary: f64,

    pub status: EmployeeStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Employee {
    /// Map an admin API customer record at list position `ctx.index`.
    pub fn from_admin(record: &Value, ctx: &RecordContext) -> Self {
        let text = |mapping: &crate::mapping::FieldMapping| {
            mapping.text(record, ctx).unwrap_or_default()
        };

        Self {
            id: employee::ID.number(record, ctx) as i64,
            employee_code: text(&employee::EMPLOYEE_CODE),
            full_name: text(&employee::FULL_NAME),
            email: text(&employee::EMAIL),
            phone: text(&employee::PHONE),
            position: text(&employee::POSITION),
            department: text(&employee::DEPARTMENT),
            hire_date: employee::HIRE_DATE
                .source(record)
                .and_then(Value::as_str)
                .and_then(date_part)
                .unwrap_or_else(|| ctx.today.format("%Y-%m-%d").to_string()),
            salary: employee::SALARY.number(record, ctx),
            status: EmployeeStatus::from_admin(record),
            avatar: employee::AVATAR.text(record, ctx),
        }
    }

    /// Map a list of admin API records.
    pub fn from_admin_list(records: &[Value], today: NaiveDate) -> Vec<Self> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| Self::from_admin(record, &RecordContext { index, today }))
            .collect()
    }
}

/// UTC calendar date of an admin API timestamp.
///
/// Timestamps without an offset are taken as UTC.
fn date_part(raw: &str) -> Option<String> {
    let date = if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        at.with_timezone(&Utc).date_naive()
    } else if let Ok(at) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        at.date()
    } else {
        NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()?
    };
    Some(date.format("%Y-%m-%d").to_string())
}

/// Fields required to create an employee.
pub const EMPLOYEE_REQUIRED_FIELDS: [&str; 8] = [
    "employeeCode",
    "fullName",
    "email",
    "phone",
    "position",
    "department",
    "hireDate",
    "salary",
];

/// Body of `POST /api/employees` and `POST /employees` on the admin API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCreateRequest {
    pub employee_code: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub department: String,
    pub hire_date: String,
    pub salary: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl EmployeeCreateRequest {
    /// Parse a raw body, naming the first missing or empty required field.
    ///
    /// # Errors
    ///
    /// `BadRequest` for a missing field or a body that does not fit.
    pub fn from_json(body: &Value) -> Result<Self, HrmError> {
        for field in EMPLOYEE_REQUIRED_FIELDS {
            if !body.get(field).is_some_and(is_truthy) {
                return Err(HrmError::BadRequest(format!(
                    "Missing required field: {field}"
                )));
            }
        }

        serde_json::from_value(body.clone())
            .map_err(|e| HrmError::BadRequest(format!("Invalid employee: {e}")))
    }
}

/// Body of `PUT /api/employees/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EmployeeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl EmployeeUpdateRequest {
    /// Overlay the present fields onto `employee`. The ID never changes.
    pub fn apply_to(self, employee: &mut Employee) {
        if let Some(v) = self.employee_code {
            employee.employee_code = v;
        }
        if let Some(v) = self.full_name {
            employee.full_name = v;
        }
        if let Some(v) = self.email {
            employee.email = v;
        }
        if let Some(v) = self.phone {
            employee.phone = v;
        }
        if let Some(v) = self.position {
            employee.position = v;
        }
        if let Some(v) = self.department {
            employee.department = v;
        }
        if let Some(v) = self.hire_date {
            employee.hire_date = v;
        }
        if let Some(v) = self.salary {
            employee.salary = v;
        }
        if let Some(v) = self.status {
            employee.status = v;
        }
        if self.avatar.is_some() {
            employee.avatar = self.avatar;
        }
    }
}

// ============================================================================
// Work days
// ============================================================================

/// Worked days per month for one employee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDaysRow {
    pub id: i64,
    pub employee: String,
    pub department: String,
    pub january: f64,
    pub february: f64,
    pub march: f64,
    pub april: f64,
    pub may: f64,
    pub june: f64,
    pub july: f64,
    pub august: f64,
    pub september: f64,
    pub october: f64,
    pub november: f64,
    pub december: f64,
}

impl WorkDaysRow {
    pub fn from_admin(record: &Value, ctx: &RecordContext) -> Self {
        let [january, february, march, april, may, june, july, august, september, october, november, december] =
            work_days::MONTHS.map(|m| m.number(record, ctx));

        Self {
            id: work_days::ID.number(record, ctx) as i64,
            employee: work_days::EMPLOYEE.text(record, ctx).unwrap_or_default(),
            department: work_days::DEPARTMENT.text(record, ctx).unwrap_or_default(),
            january,
            february,
            march,
            april,
            may,
            june,
            july,
            august,
            september,
            october,
            november,
            december,
        }
    }

    pub fn from_admin_list(records: &[Value], today: NaiveDate) -> Vec<Self> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| Self::from_admin(record, &RecordContext { index, today }))
            .collect()
    }

    /// January through December.
    pub fn months(&self) -> [f64; 12] {
        [
            self.january,
            self.february,
            self.march,
            self.april,
            self.may,
            self.june,
            self.july,
            self.august,
            self.september,
            self.october,
            self.november,
            self.december,
        ]
    }

    pub fn month(&self, month: Month) -> f64 {
        self.months()
            .get(month as usize)
            .copied()
            .unwrap_or_default()
    }

    pub fn yearly_total(&self) -> f64 {
        self.months().iter().sum()
    }
}

/// Calendar month, as named in work-day filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub fn as_str(self) -> &'static str {
        match self {
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
            Month::July => "july",
            Month::August => "august",
            Month::September => "september",
            Month::October => "october",
            Month::November => "november",
            Month::December => "december",
        }
    }
}

/// Body of work-day create/update calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDaysRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(flatten)]
    pub months: serde_json::Map<String, Value>,
}

/// Server-side work-day filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDaysFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<Month>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_days: Option<f64>,
}

/// Per-department work-day summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentWorkDays {
    pub department: String,
    pub total_employees: usize,
    pub average_work_days: f64,
}

/// Summary shown above the work-day table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDaysStatistics {
    pub total_employees: usize,
    /// Rounded to the nearest whole day.
    pub average_work_days_per_month: f64,
    pub highest_work_days_per_year: f64,
    pub lowest_work_days_per_year: f64,
    pub department_stats: Vec<DepartmentWorkDays>,
}

// ============================================================================
// Lookups
// ============================================================================

/// One option of an admin API combobox list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupItem {
    #[serde(default)]
    pub ma_danh_muc: Option<String>,
    #[serde(default)]
    pub gia_tri_danh_muc: Option<String>,
    #[serde(default)]
    pub gia_tri_danh_muc_en: Option<String>,
    #[serde(default)]
    pub dien_giai: Option<String>,
}
