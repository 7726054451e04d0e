use std::sync::Arc;

use anyhow::Result;

use crate::api::client::ApiClient;
use crate::config::settings::Settings;
use crate::errors::TicketFlowError;
use crate::models::user::User;
use crate::store::credentials::{CredentialStore, FileCredentialStore};
use crate::store::session::{SessionHandle, SessionStore};
use crate::store::tickets::TicketStore;

/// Everything a command handler needs, wired together: the API client and
/// the session and ticket stores. The client and the session store share one
/// [`SessionHandle`], so a 401 intercepted in the client is immediately
/// visible as a logged-out session here.
pub struct App {
    pub client: ApiClient,
    pub session: SessionStore,
    pub tickets: TicketStore,
}

impl App {
    /// Builds the context from the config file and any session a previous
    /// login left behind.
    pub fn new() -> Result<Self> {
        let settings = Settings::load()?;
        let credentials = Arc::new(FileCredentialStore::new(FileCredentialStore::default_path()?));
        Ok(Self::assemble(&settings, credentials))
    }

    fn assemble(settings: &Settings, credentials: Arc<dyn CredentialStore>) -> Self {
        let handle = SessionHandle::new();
        let client = ApiClient::new(
            &settings.api.base_url,
            handle.clone(),
            Arc::clone(&credentials),
        );
        let mut session = SessionStore::new(handle, credentials);
        session.initialize();

        Self {
            client,
            session,
            tickets: TicketStore::new(),
        }
    }

    /// Guard for commands that need a signed-in user.
    pub fn require_auth(&self) -> Result<User> {
        self.session
            .user()
            .ok_or_else(|| anyhow::anyhow!("{}", TicketFlowError::NotLoggedIn))
    }
}
