//! Service layer for the HRM portal.
//!
//! Wrappers around the external admin API plus the in-process employee
//! directory.
//!
//! # Components
//!
//! - `admin_client` - HTTP client and status mapping for the admin API
//! - `auth` - Login and post-login redirect
//! - `directory` - In-process employee records behind `/api/employees`
//! - `employees` - Employee list, search, and CRUD on the admin API
//! - `lookups` - Cached combobox lookup lists
//! - `workdays` - Work-day tables, filtering, and statistics

pub mod admin_client;
pub mod auth;
pub mod directory;
pub mod employees;
pub mod lookups;
pub mod workdays;

pub use admin_client::AdminClient;
pub use auth::AuthService;
pub use directory::EmployeeDirectory;
pub use employees::EmployeeService;
pub use lookups::LookupService;
pub use workdays::WorkDaysService;
