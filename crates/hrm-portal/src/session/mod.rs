//! Session lifecycle: storage, validity, and the guard that enforces it.
//!
//! A [`SessionContext`] is built per caller and passed explicitly to the
//! code that needs it; there is no process-wide session state. The context
//! decides which persistence backends the session is mirrored to:
//!
//! - [`SessionContext::client`]: durable key/value store plus cookies
//! - [`SessionContext::server`]: the request's cookies only

pub mod guard;
pub mod model;
pub mod persistence;
pub mod store;
pub mod validator;

pub use guard::SessionGuard;
pub use model::{LogoutReason, LogoutSignal, Session, SessionState, UserInfo};
pub use persistence::{CookiePersistence, KeyValuePersistence, SessionPersistence};
pub use store::TokenStore;
pub use validator::TokenValidator;

use common::clock::Clock;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SessionContext {
    guard: SessionGuard,
}

impl SessionContext {
    /// Client context: key/value store first, cookies as fallback.
    pub fn client(
        key_value: KeyValuePersistence,
        cookies: Arc<CookiePersistence>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let backends: Vec<Arc<dyn SessionPersistence>> = vec![Arc::new(key_value), cookies];
        Self::with_backends(backends, clock)
    }

    /// Server context: the request's cookies are the only transport.
    pub fn server(cookies: Arc<CookiePersistence>, clock: Arc<dyn Clock>) -> Self {
        let backends: Vec<Arc<dyn SessionPersistence>> = vec![cookies];
        Self::with_backends(backends, clock)
    }

    pub fn with_backends(backends: Vec<Arc<dyn SessionPersistence>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            guard: SessionGuard::new(TokenStore::new(backends, clock)),
        }
    }

    pub fn guard(&self) -> &SessionGuard {
        &self.guard
    }

    pub fn store(&self) -> &TokenStore {
        self.guard.store()
    }
}
