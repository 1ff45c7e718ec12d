//! Token store: the single read/write path for session credentials.

use super::model::{Session, UserInfo, DEFAULT_TOKEN_LIFETIME_SECONDS};
use super::persistence::SessionPersistence;
use super::validator::TokenValidator;
use crate::errors::HrmError;
use chrono::{DateTime, Duration, Utc};
use common::clock::Clock;
use common::secret::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Mirrors every write to each configured backend. Reads take the first
/// backend that holds a token, in configuration order.
#[derive(Clone)]
pub struct TokenStore {
    backends: Vec<Arc<dyn SessionPersistence>>,
    clock: Arc<dyn Clock>,
    validator: TokenValidator,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.backends.iter().map(|b| b.name()).collect();
        f.debug_struct("TokenStore")
            .field("backends", &names)
            .finish_non_exhaustive()
    }
}

impl TokenStore {
    pub fn new(backends: Vec<Arc<dyn SessionPersistence>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backends,
            clock,
            validator: TokenValidator::default(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Store a new session.
    ///
    /// `expires_in_seconds` of `None` or `0` means the default one hour.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the access token is blank or the lifetime is out
    /// of range.
    pub fn set_token(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_in_seconds: Option<u64>,
    ) -> Result<Session, HrmError> {
        if access_token.trim().is_empty() {
            return Err(HrmError::InvalidArgument(
                "Access token must not be empty".to_string(),
            ));
        }

        let lifetime = expires_in_seconds
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECONDS);
        let delta = i64::try_from(lifetime)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                HrmError::InvalidArgument(format!("Token lifetime out of range: {lifetime}s"))
            })?;
        let expires_at = self
            .now()
            .checked_add_signed(delta)
            .ok_or_else(|| {
                HrmError::InvalidArgument(format!("Token lifetime out of range: {lifetime}s"))
            })?;

        let session = Session {
            access_token: SecretString::from(access_token.to_string()),
            refresh_token: refresh_token
                .filter(|r| !r.is_empty())
                .map(|r| SecretString::from(r.to_string())),
            expires_at: Some(expires_at),
        };

        for backend in &self.backends {
            backend.save(&session, lifetime);
        }

        debug!(
            target: "hrm.session.store",
            expires_at = %expires_at,
            has_refresh_token = session.refresh_token.is_some(),
            "Session stored"
        );

        Ok(session)
    }

    /// Raw stored session, without any validity check.
    pub fn load(&self) -> Option<Session> {
        self.backends.iter().find_map(|b| b.load())
    }

    /// The access token, if the stored session is not expired.
    ///
    /// An expired session is cleared as a side effect.
    pub fn get_token(&self) -> Option<SecretString> {
        let session = self.load()?;

        if self.validator.is_expired(session.expires_at, self.now()) {
            debug!(target: "hrm.session.store", "Stored session expired, clearing");
            self.clear();
            return None;
        }

        Some(session.access_token)
    }

    pub fn refresh_token(&self) -> Option<SecretString> {
        self.load().and_then(|s| s.refresh_token)
    }

    /// Remove the session from every backend. Idempotent.
    pub fn clear(&self) {
        for backend in &self.backends {
            backend.clear();
        }
    }

    pub fn set_user_info(&self, user: &UserInfo) {
        for backend in &self.backends {
            backend.save_user(user);
        }
    }

    pub fn user_info(&self) -> Option<UserInfo> {
        self.backends.iter().find_map(|b| b.load_user())
    }

    /// Whether the stored token passes the structural check.
    pub fn has_well_formed_token(&self) -> bool {
        self.load()
            .is_some_and(|s| self.validator.has_valid_format(s.access_token.expose_secret()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::session::persistence::{CookiePersistence, KeyValuePersistence};
    use axum_extra::extract::cookie::{Cookie, CookieJar};
    use common::clock::ManualClock;

    fn stores() -> (TokenStore, KeyValuePersistence, Arc<CookiePersistence>, ManualClock) {
        let kv = KeyValuePersistence::new();
        let cookies = Arc::new(CookiePersistence::new(CookieJar::new(), true));
        let clock = ManualClock::starting_now();
        let backends: Vec<Arc<dyn SessionPersistence>> =
            vec![Arc::new(kv.clone()), cookies.clone()];
        let store = TokenStore::new(backends, Arc::new(clock.clone()));
        (store, kv, cookies, clock)
    }

    #[test]
    fn test_set_token_rejects_empty() {
        let (store, ..) = stores();

        assert!(matches!(
            store.set_token("", None, None),
            Err(HrmError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.set_token("   ", None, None),
            Err(HrmError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_set_token_defaults_to_one_hour() {
        let (store, ..) = stores();
        let now = store.now();

        let session = store.set_token("YQ.Yg.Yw", None, None).unwrap();

        assert_eq!(session.expires_at, Some(now + Duration::seconds(3600)));
    }

    #[test]
    fn test_zero_lifetime_means_default() {
        let (store, ..) = stores();
        let now = store.now();

        let session = store.set_token("YQ.Yg.Yw", None, Some(0)).unwrap();

        assert_eq!(session.expires_at, Some(now + Duration::seconds(3600)));
    }

    #[test]
    fn test_set_token_mirrors_to_every_backend() {
        let (store, kv, cookies, _clock) = stores();

        store.set_token("YQ.Yg.Yw", Some("refresh"), Some(7200)).unwrap();

        assert!(kv.load().is_some());
        assert!(cookies.load().is_some());
        assert_eq!(
            kv.load().unwrap().expires_at_millis(),
            cookies.load().unwrap().expires_at_millis()
        );
    }

    #[test]
    fn test_get_token_respects_buffer() {
        let (store, _kv, _cookies, clock) = stores();
        store.set_token("YQ.Yg.Yw", None, Some(3600)).unwrap();

        clock.advance(Duration::seconds(3600 - 301));
        assert!(store.get_token().is_some());

        clock.advance(Duration::seconds(2));
        assert!(store.get_token().is_none());
        // Expired sessions are purged.
        assert!(store.load().is_none());
    }

    #[test]
    fn test_reads_fall_back_to_cookies() {
        let kv = KeyValuePersistence::new();
        let clock = ManualClock::starting_now();
        let marker = (clock.now() + Duration::hours(1)).timestamp_millis();
        let jar = CookieJar::new()
            .add(Cookie::new("hrm_auth_token", "YQ.Yg.Yw"))
            .add(Cookie::new("hrm_token_expiry", marker.to_string()));
        let cookies = Arc::new(CookiePersistence::new(jar, true));
        let backends: Vec<Arc<dyn SessionPersistence>> = vec![Arc::new(kv), cookies];
        let store = TokenStore::new(backends, Arc::new(clock));

        assert_eq!(store.get_token().unwrap().expose_secret(), "YQ.Yg.Yw");
    }

    #[test]
    fn test_cookie_without_expiry_is_expired() {
        let jar = CookieJar::new().add(Cookie::new("accessToken", "YQ.Yg.Yw"));
        let cookies = Arc::new(CookiePersistence::new(jar, true));
        let backends: Vec<Arc<dyn SessionPersistence>> = vec![cookies];
        let store = TokenStore::new(backends, Arc::new(ManualClock::starting_now()));

        assert!(store.get_token().is_none());
    }

    #[test]
    fn test_clear_removes_everything() {
        let (store, kv, cookies, _clock) = stores();
        store.set_token("YQ.Yg.Yw", Some("r"), None).unwrap();
        store.set_user_info(&UserInfo {
            full_name: Some("Alice".to_string()),
            ..UserInfo::default()
        });

        store.clear();
        store.clear();

        assert!(store.load().is_none());
        assert!(store.user_info().is_none());
        assert!(kv.load().is_none());
        assert!(cookies.load().is_none());
    }

    #[test]
    fn test_well_formed_check() {
        let (store, ..) = stores();
        store.set_token("definitely-not-a-jwt", None, None).unwrap();

        assert!(store.get_token().is_some());
        assert!(!store.has_well_formed_token());
    }
}
