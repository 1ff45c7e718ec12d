//! # HRM Test Utilities
//!
//! Shared test utilities for the HRM portal.
//!
//! This crate provides:
//! - Server test harness (`TestPortalServer` for E2E tests)
//! - Admin API mock with response fixtures (`AdminApiMock`)
//! - Bearer token builders (`TestTokenBuilder`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hrm_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let admin = AdminApiMock::start().await;
//!     let server = TestPortalServer::spawn(&admin.uri()).await?;
//!
//!     let response = server
//!         .client()
//!         .get(format!("{}/employees", server.url()))
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 303);
//!     Ok(())
//! }
//! ```

pub mod admin_mock;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use admin_mock::*;
pub use server_harness::*;
pub use token_builders::*;
