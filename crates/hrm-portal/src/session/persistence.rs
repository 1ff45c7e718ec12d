//! Session persistence backends.
//!
//! A session is written to every backend a [`TokenStore`] is configured
//! with. Backends never fail from the caller's point of view: a backend that
//! cannot be read behaves as empty, and a failed write is logged and
//! dropped.
//!
//! [`TokenStore`]: super::store::TokenStore

use super::model::{
    parse_expiry_marker, Session, UserInfo, AUTH_TOKEN_KEY, COMPAT_ACCESS_TOKEN_COOKIE,
    COMPAT_REFRESH_TOKEN_COOKIE, REFRESH_COOKIE_LIFETIME_SECONDS, REFRESH_TOKEN_KEY,
    TOKEN_EXPIRY_KEY, USER_INFO_KEY,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};
use tracing::warn;

/// A place a session can be kept.
pub trait SessionPersistence: Send + Sync + fmt::Debug {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Read the stored session, if a non-empty access token is present.
    fn load(&self) -> Option<Session>;

    /// Store `session`. `lifetime_seconds` bounds transports that expire
    /// on their own (cookie Max-Age).
    fn save(&self, session: &Session, lifetime_seconds: u64);

    /// Remove everything this backend stores. Idempotent.
    fn clear(&self);

    /// Stored user profile. Backends without profile support return `None`.
    fn load_user(&self) -> Option<UserInfo> {
        None
    }

    /// Store the user profile. Ignored by backends without profile support.
    fn save_user(&self, _user: &UserInfo) {}
}

// =============================================================================
// Key/value backend
// =============================================================================

/// Durable string key/value store, the server-side stand-in for browser
/// local storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct KeyValuePersistence {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl KeyValuePersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value for `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn write(&self, apply: impl FnOnce(&mut HashMap<String, String>)) {
        match self.entries.write() {
            Ok(mut entries) => apply(&mut entries),
            Err(_) => {
                warn!(target: "hrm.session.persistence", backend = "key_value", "Store unavailable, write dropped");
            }
        }
    }
}

impl SessionPersistence for KeyValuePersistence {
    fn name(&self) -> &'static str {
        "key_value"
    }

    fn load(&self) -> Option<Session> {
        let entries = self.entries.read().ok()?;
        let token = entries.get(AUTH_TOKEN_KEY).filter(|t| !t.is_empty())?;

        Some(Session {
            access_token: SecretString::from(token.clone()),
            refresh_token: entries
                .get(REFRESH_TOKEN_KEY)
                .filter(|t| !t.is_empty())
                .map(|t| SecretString::from(t.clone())),
            expires_at: entries
                .get(TOKEN_EXPIRY_KEY)
                .and_then(|raw| parse_expiry_marker(raw)),
        })
    }

    fn save(&self, session: &Session, _lifetime_seconds: u64) {
        self.write(|entries| {
            entries.insert(
                AUTH_TOKEN_KEY.to_string(),
                session.access_token.expose_secret().to_string(),
            );
            match &session.refresh_token {
                Some(refresh) => {
                    entries.insert(
                        REFRESH_TOKEN_KEY.to_string(),
                        refresh.expose_secret().to_string(),
                    );
                }
                None => {
                    entries.remove(REFRESH_TOKEN_KEY);
                }
            }
            match session.expires_at_millis() {
                Some(millis) => {
                    entries.insert(TOKEN_EXPIRY_KEY.to_string(), millis.to_string());
                }
                None => {
                    entries.remove(TOKEN_EXPIRY_KEY);
                }
            }
        });
    }

    fn clear(&self) {
        self.write(|entries| {
            for key in [AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRY_KEY, USER_INFO_KEY] {
                entries.remove(key);
            }
        });
    }

    fn load_user(&self) -> Option<UserInfo> {
        let raw = self.get(USER_INFO_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    fn save_user(&self, user: &UserInfo) {
        match serde_json::to_string(user) {
            Ok(json) => self.write(|entries| {
                entries.insert(USER_INFO_KEY.to_string(), json);
            }),
            Err(e) => {
                warn!(target: "hrm.session.persistence", error = %e, "Failed to encode user info");
            }
        }
    }
}

// =============================================================================
// Cookie backend
// =============================================================================

/// Request-scoped cookie transport.
///
/// Wraps the request's [`CookieJar`]; writes accumulate in the jar, which the
/// handler returns with its response via [`CookiePersistence::jar`].
#[derive(Debug)]
pub struct CookiePersistence {
    jar: Mutex<CookieJar>,
    secure: bool,
}

impl CookiePersistence {
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self {
            jar: Mutex::new(jar),
            secure,
        }
    }

    /// Current jar, including every cookie written or removed so far.
    pub fn jar(&self) -> CookieJar {
        match self.jar.lock() {
            Ok(jar) => jar.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn value(jar: &CookieJar, names: &[&str]) -> Option<String> {
        names
            .iter()
            .filter_map(|name| jar.get(name))
            .map(|cookie| cookie.value().to_string())
            .find(|value| !value.is_empty())
    }

    fn cookie(&self, name: &'static str, value: String, max_age_seconds: u64) -> Cookie<'static> {
        let max_age = i64::try_from(max_age_seconds).unwrap_or(i64::MAX);
        Cookie::build((name, value))
            .path("/")
            .max_age(time::Duration::seconds(max_age))
            .same_site(SameSite::Strict)
            .secure(self.secure)
            // The expiry marker is the only cookie page scripts need to read.
            .http_only(name != TOKEN_EXPIRY_KEY)
            .build()
    }

    fn removal(name: &'static str) -> Cookie<'static> {
        let mut removal = Cookie::build((name, "")).path("/").build();
        removal.make_removal();
        removal
    }

    fn update(&self, apply: impl FnOnce(CookieJar) -> CookieJar) {
        match self.jar.lock() {
            Ok(mut jar) => {
                let current = std::mem::take(&mut *jar);
                *jar = apply(current);
            }
            Err(_) => {
                warn!(target: "hrm.session.persistence", backend = "cookie", "Cookie jar unavailable, write dropped");
            }
        }
    }
}

const COOKIE_NAMES: [&str; 5] = [
    AUTH_TOKEN_KEY,
    COMPAT_ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_KEY,
    COMPAT_REFRESH_TOKEN_COOKIE,
    TOKEN_EXPIRY_KEY,
];

impl SessionPersistence for CookiePersistence {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn load(&self) -> Option<Session> {
        let jar = self.jar.lock().ok()?;
        let token = Self::value(&jar, &[AUTH_TOKEN_KEY, COMPAT_ACCESS_TOKEN_COOKIE])?;

        Some(Session {
            access_token: SecretString::from(token),
            refresh_token: Self::value(&jar, &[REFRESH_TOKEN_KEY, COMPAT_REFRESH_TOKEN_COOKIE])
                .map(SecretString::from),
            expires_at: Self::value(&jar, &[TOKEN_EXPIRY_KEY])
                .and_then(|raw| parse_expiry_marker(&raw)),
        })
    }

    fn save(&self, session: &Session, lifetime_seconds: u64) {
        let token = session.access_token.expose_secret().to_string();
        let mut cookies = vec![
            self.cookie(AUTH_TOKEN_KEY, token.clone(), lifetime_seconds),
            self.cookie(COMPAT_ACCESS_TOKEN_COOKIE, token, lifetime_seconds),
        ];
        match &session.refresh_token {
            Some(refresh) => {
                let refresh = refresh.expose_secret().to_string();
                cookies.push(self.cookie(REFRESH_TOKEN_KEY, refresh.clone(), lifetime_seconds));
                cookies.push(self.cookie(
                    COMPAT_REFRESH_TOKEN_COOKIE,
                    refresh,
                    REFRESH_COOKIE_LIFETIME_SECONDS,
                ));
            }
            // A refresh token from an earlier session must not outlive it
            None => {
                cookies.push(Self::removal(REFRESH_TOKEN_KEY));
                cookies.push(Self::removal(COMPAT_REFRESH_TOKEN_COOKIE));
            }
        }
        match session.expires_at_millis() {
            Some(millis) => {
                cookies.push(self.cookie(TOKEN_EXPIRY_KEY, millis.to_string(), lifetime_seconds));
            }
            None => cookies.push(Self::removal(TOKEN_EXPIRY_KEY)),
        }

        self.update(|jar| cookies.into_iter().fold(jar, CookieJar::add));
    }

    fn clear(&self) {
        self.update(|jar| {
            COOKIE_NAMES
                .iter()
                .fold(jar, |jar, name| jar.add(Self::removal(*name)))
        });
    }
}
