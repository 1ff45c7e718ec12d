//! Declarative field mapping from admin API records.
//!
//! The admin API returns loosely shaped JSON whose field names differ per
//! endpoint. Each target field is described by a [`FieldMapping`]: an ordered
//! list of candidate source keys and a [`FieldDefault`]. The first candidate
//! holding a truthy value wins; `null`, `""`, `0` and `false` fall through to
//! the next candidate and finally to the default.

use chrono::NaiveDate;
use serde_json::Value;

/// Value used when no source key yields a truthy value.
#[derive(Debug, Clone, Copy)]
pub enum FieldDefault {
    /// A fixed string.
    Text(&'static str),
    /// A fixed number.
    Number(i64),
    /// The record's 1-based position in its list.
    Ordinal,
    /// A string derived from the 1-based position.
    Indexed(fn(usize) -> String),
    /// The current date, `YYYY-MM-DD`.
    Today,
    /// No value.
    Absent,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub field: &'static str,
    pub sources: &'static [&'static str],
    pub default: FieldDefault,
}

/// Context a default may depend on.
#[derive(Debug, Clone, Copy)]
pub struct RecordContext {
    /// 0-based position of the record in the response list.
    pub index: usize,
    pub today: NaiveDate,
}

impl RecordContext {
    pub fn ordinal(&self) -> usize {
        self.index + 1
    }
}

/// JavaScript truthiness, as far as JSON values go.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl FieldMapping {
    pub const fn new(
        field: &'static str,
        sources: &'static [&'static str],
        default: FieldDefault,
    ) -> Self {
        Self {
            field,
            sources,
            default,
        }
    }

    /// First truthy source value.
    pub fn source<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        self.sources
            .iter()
            .filter_map(|key| record.get(key))
            .find(|value| is_truthy(value))
    }

    /// Resolve as text. Numbers and booleans are rendered.
    pub fn text(&self, record: &Value, ctx: &RecordContext) -> Option<String> {
        match self.source(record) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            Some(other) => Some(other.to_string()),
            None => self.default_text(ctx),
        }
    }

    /// Resolve as a number. Numeric strings are parsed; anything else
    /// falls back to the default.
    pub fn number(&self, record: &Value, ctx: &RecordContext) -> f64 {
        let parsed = self.source(record).and_then(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        });

        match parsed {
            Some(n) => n,
            None => match self.default {
                FieldDefault::Number(n) => n as f64,
                FieldDefault::Ordinal => ctx.ordinal() as f64,
                _ => 0.0,
            },
        }
    }

    fn default_text(&self, ctx: &RecordContext) -> Option<String> {
        match self.default {
            FieldDefault::Text(s) => Some(s.to_string()),
            FieldDefault::Number(n) => Some(n.to_string()),
            FieldDefault::Ordinal => Some(ctx.ordinal().to_string()),
            FieldDefault::Indexed(render) => Some(render(ctx.ordinal())),
            FieldDefault::Today => Some(ctx.today.format("%Y-%m-%d").to_string()),
            FieldDefault::Absent => None,
        }
    }
}

// =============================================================================
// Employee
// =============================================================================

fn employee_code(n: usize) -> String {
    format!("EMP{n:03}")
}

fn employee_name(n: usize) -> String {
    format!("Nhân viên {n}")
}

fn employee_email(n: usize) -> String {
    format!("employee{n}@company.com")
}

pub mod employee {
    use super::{FieldDefault, FieldMapping};

    pub const ID: FieldMapping = FieldMapping::new("id", &["id"], FieldDefault::Ordinal);
    pub const EMPLOYEE_CODE: FieldMapping = FieldMapping::new(
        "employeeCode",
        &["maKhachHang", "maTaiKhoanGiaoDich"],
        FieldDefault::Indexed(super::employee_code),
    );
    pub const FULL_NAME: FieldMapping = FieldMapping::new(
        "fullName",
        &["hoTenKhachHang", "fullName", "name"],
        FieldDefault::Indexed(super::employee_name),
    );
    pub const EMAIL: FieldMapping = FieldMapping::new(
        "email",
        &["email"],
        FieldDefault::Indexed(super::employee_email),
    );
    pub const PHONE: FieldMapping = FieldMapping::new(
        "phone",
        &["soDiDong", "soDienThoaiLienHe", "phone"],
        FieldDefault::Text("0000000000"),
    );
    pub const POSITION: FieldMapping = FieldMapping::new(
        "position",
        &["chucVu", "position"],
        FieldDefault::Text("Nhân viên"),
    );
    pub const DEPARTMENT: FieldMapping = FieldMapping::new(
        "department",
        &["ngheNghiep", "department"],
        FieldDefault::Text("Chưa xác định"),
    );
    /// Only the date part of `createdTime` is kept.
    pub const HIRE_DATE: FieldMapping =
        FieldMapping::new("hireDate", &["createdTime"], FieldDefault::Today);
    pub const SALARY: FieldMapping = FieldMapping::new("salary", &["salary"], FieldDefault::Number(0));
    pub const AVATAR: FieldMapping = FieldMapping::new("avatar", &["avatar"], FieldDefault::Absent);
}

// =============================================================================
// Work days
// =============================================================================

pub mod work_days {
    use super::{FieldDefault, FieldMapping};

    pub const ID: FieldMapping = FieldMapping::new("id", &["id"], FieldDefault::Ordinal);
    pub const EMPLOYEE: FieldMapping = FieldMapping::new(
        "employee",
        &["hoTenKhachHang", "fullName", "name"],
        FieldDefault::Indexed(super::employee_name),
    );
    pub const DEPARTMENT: FieldMapping = FieldMapping::new(
        "department",
        &["chucVu", "department", "phongBan"],
        FieldDefault::Text("Chưa xác định"),
    );

    const fn month(field: &'static str, sources: &'static [&'static str]) -> FieldMapping {
        FieldMapping::new(field, sources, FieldDefault::Number(0))
    }

    /// January through December, in order.
    pub const MONTHS: [FieldMapping; 12] = [
        month("january", &["thang1", "january"]),
        month("february", &["thang2", "february"]),
        month("march", &["thang3", "march"]),
        month("april", &["thang4", "april"]),
        month("may", &["thang5", "may"]),
        month("june", &["thang6", "june"]),
        month("july", &["thang7", "july"]),
        month("august", &["thang8", "august"]),
        month("september", &["thang9", "september"]),
        month("october", &["thang10", "october"]),
        month("november", &["thang11", "november"]),
        month("december", &["thang12", "december"]),
    ];
}
