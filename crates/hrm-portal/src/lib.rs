//! HRM Portal Library
//!
//! Backend for the HRM web portal. Holds each user's admin API session in
//! cookies and fronts the external admin API:
//!
//! - Login, logout, and session validity (token lifecycle)
//! - Page gating on the session cookie
//! - Employee and work-day data mapped from admin API records
//! - Cached combobox lookups shared across sessions
//! - An in-process employee directory behind `/api/employees`
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/*.rs -> handlers/*.rs -> services/*.rs -> admin API
//!                                          |
//!                                      session/*.rs (per request, from cookies)
//! ```
//!
//! # Modules
//!
//! - `cache` - Request cache with in-flight deduplication
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `mapping` - Admin API field mapping tables
//! - `middleware` - Route filter, bearer auth, HTTP metrics
//! - `models` - Data models
//! - `observability` - Metrics definitions
//! - `routes` - Axum router setup
//! - `services` - Admin API wrappers and the employee directory
//! - `session` - Token storage, validation, and the session guard

pub mod cache;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod mapping;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
pub mod session;
