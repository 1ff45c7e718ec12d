//! Common utilities and types shared across the HRM portal crates.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for structural bearer-token checks
pub mod token;

/// Module for wall-clock abstraction used by expiry arithmetic
pub mod clock;
