//! Token validity checks: structure and expiry.
//!
//! Structure is checked by [`common::token`]; this module adds the expiry
//! rule. Expiry is fail-closed: a session without an expiry is expired, and
//! a token stops being usable [`EXPIRY_BUFFER_SECONDS`] before its real
//! expiry.

use super::model::{Session, EXPIRY_BUFFER_SECONDS};
use chrono::{DateTime, Duration, Utc};
use common::secret::ExposeSecret;

#[derive(Debug, Clone, Copy)]
pub struct TokenValidator {
    buffer: Duration,
}

impl Default for TokenValidator {
    fn default() -> Self {
        Self {
            buffer: Duration::seconds(EXPIRY_BUFFER_SECONDS),
        }
    }
}

impl TokenValidator {
    /// `true` if `expires_at` is absent or `now >= expires_at - buffer`.
    pub fn is_expired(&self, expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match expires_at {
            None => true,
            Some(at) => now >= at - self.buffer,
        }
    }

    /// Structural check only; see [`common::token::check_format`].
    pub fn has_valid_format(&self, token: &str) -> bool {
        common::token::has_valid_format(token)
    }

    /// Well-formed and not expired.
    pub fn is_usable(&self, session: &Session, now: DateTime<Utc>) -> bool {
        self.has_valid_format(session.access_token.expose_secret())
            && !self.is_expired(session.expires_at, now)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::secret::SecretString;

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_750_000_000, 0).unwrap()
    }

    #[test]
    fn test_missing_expiry_is_expired() {
        assert!(TokenValidator::default().is_expired(None, t0()));
    }

    #[test]
    fn test_buffer_boundary() {
        let validator = TokenValidator::default();
        let e = 3600;
        let expires_at = Some(t0() + Duration::seconds(e));

        assert!(!validator.is_expired(expires_at, t0() + Duration::seconds(e - 301)));
        assert!(validator.is_expired(expires_at, t0() + Duration::seconds(e - 299)));
    }

    #[test]
    fn test_exactly_at_buffer_is_expired() {
        let validator = TokenValidator::default();
        let expires_at = t0() + Duration::seconds(600);

        assert!(validator.is_expired(Some(expires_at), t0() + Duration::seconds(300)));
        assert!(!validator.is_expired(
            Some(expires_at),
            t0() + Duration::seconds(300) - Duration::milliseconds(1)
        ));
    }

    #[test]
    fn test_short_lifetime_is_immediately_expired() {
        // Anything shorter than the buffer is never usable.
        let validator = TokenValidator::default();
        assert!(validator.is_expired(Some(t0() + Duration::seconds(120)), t0()));
    }

    #[test]
    fn test_is_usable_requires_format_and_expiry() {
        let validator = TokenValidator::default();
        let good = Session {
            access_token: SecretString::from("YQ.Yg.Yw"),
            refresh_token: None,
            expires_at: Some(t0() + Duration::hours(1)),
        };
        let malformed = Session {
            access_token: SecretString::from("not-a-jwt"),
            ..good.clone()
        };
        let no_expiry = Session {
            expires_at: None,
            ..good.clone()
        };

        assert!(validator.is_usable(&good, t0()));
        assert!(!validator.is_usable(&malformed, t0()));
        assert!(!validator.is_usable(&no_expiry, t0()));
    }
}
