use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::api::client::{ApiClient, ApiError};
use crate::models::user::User;
use crate::store::credentials::CredentialStore;

/// Token and identity of the signed-in user.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub token: String,
    pub user: User,
}

/// Shared view of the live session. The session store owns the lifecycle;
/// the API client holds a clone so every request can read the current token
/// and the 401 intercept can drop it.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<AuthState>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(|state| state.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(|state| state.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.is_some()
    }

    pub fn set(&self, token: String, user: User) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(AuthState { token, user });
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.take();
    }
}

/// Session lifecycle: restore on startup, login, logout. Reads and writes
/// the same handle the API client uses, so a 401 intercept is immediately
/// visible here as a logged-out session.
pub struct SessionStore {
    handle: SessionHandle,
    credentials: Arc<dyn CredentialStore>,
    is_loading: bool,
}

impl SessionStore {
    pub fn new(handle: SessionHandle, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            handle,
            credentials,
            is_loading: false,
        }
    }

    /// Restores the session saved by a previous login. Requires both the
    /// token and the identity; anything less stays anonymous. The token
    /// itself is not validated here, so a stale one surfaces as a 401 on
    /// the next request.
    pub fn initialize(&mut self) {
        match self.credentials.load() {
            Ok(Some(saved)) => {
                debug!("restored session for {}", saved.user.username);
                self.handle.set(saved.access_token, saved.user);
            }
            Ok(None) => {}
            Err(err) => debug!("could not restore session: {}", err),
        }
    }

    /// Authenticates against the backend. On success the client has already
    /// stored and persisted the session; on failure the session is reset to
    /// anonymous and the error is returned for the caller to report.
    pub async fn login(
        &mut self,
        client: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        self.is_loading = true;
        let result = client.login(email, password).await;
        self.is_loading = false;

        match result {
            Ok(response) => Ok(response.user),
            Err(err) => {
                self.handle.clear();
                Err(err)
            }
        }
    }

    /// Forgets the session, both in memory and on disk. Safe to call when
    /// already anonymous.
    pub fn logout(&mut self, client: &ApiClient) -> Result<(), ApiError> {
        client.clear_session()
    }

    pub fn user(&self) -> Option<User> {
        self.handle.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.handle.is_authenticated()
    }

    #[allow(dead_code)]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
}
