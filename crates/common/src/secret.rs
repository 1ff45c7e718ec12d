//! Secret types for session credentials.
//!
//! Re-exports the [`secrecy`] types used for every credential the portal
//! handles: admin API access tokens, refresh tokens, and login passwords.
//! `SecretString` redacts itself in `Debug`, so structs deriving `Debug`
//! that hold one stay safe to log through `tracing`.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginForm {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let form = LoginForm {
//!     username: "hr.admin".to_string(),
//!     password: SecretString::from("hunter2"),
//! };
//!
//! assert!(!format!("{form:?}").contains("hunter2"));
//! assert_eq!(form.password.expose_secret(), "hunter2");
//! ```
//!
//! Wrap in `SecretString`:
//! - access tokens and refresh tokens (in the session store and cookies)
//! - login passwords (request bodies forwarded to the admin API)

pub use secrecy::{ExposeSecret, SecretString};
