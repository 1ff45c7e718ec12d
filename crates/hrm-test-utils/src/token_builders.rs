//! Builder patterns for test tokens
//!
//! Tokens are HS256-signed with a fixed test secret. The portal never checks
//! the signature; it only needs the three-segment shape and the payload.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

/// Secret used to sign test tokens.
pub const TEST_SIGNING_SECRET: &[u8] = b"hrm-portal-test-secret";

/// Builder for test bearer tokens
///
/// # Example
/// ```rust,ignore
/// let header = TestTokenBuilder::new()
///     .for_user("nv001")
///     .with_role("admin")
///     .bearer();
/// ```
pub struct TestTokenBuilder {
    sub: String,
    role: Option<String>,
    exp: i64,
    iat: i64,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: "test-user".to_string(),
            role: None,
            exp: (now + Duration::seconds(3600)).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Set the subject
    pub fn for_user(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    /// Set the `role` claim
    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    /// Set expiration in seconds from now
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Build the claims as a JSON value
    pub fn claims(&self) -> serde_json::Value {
        let mut claims = json!({
            "sub": self.sub,
            "exp": self.exp,
            "iat": self.iat,
        });
        if let Some(role) = &self.role {
            claims["role"] = json!(role);
        }
        claims
    }

    /// Build the signed token
    pub fn build(self) -> String {
        encode(
            &Header::default(),
            &self.claims(),
            &EncodingKey::from_secret(TEST_SIGNING_SECRET),
        )
        .expect("test token should encode")
    }

    /// Build an `Authorization` header value
    pub fn bearer(self) -> String {
        format!("Bearer {}", self.build())
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
