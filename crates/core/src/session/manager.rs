use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use super::store::{CredentialKey, CredentialStore, MemoryCredentialStore, SessionError};
use crate::authentication::{decode_claims, TokenClaims, TokenPair};

/// Session changes the application layer reacts to, for example by showing a notice
/// or routing to the login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    Refreshed,
    SignedOut,
    Expired { reason: String, redirect_to: String },
    AccessDenied { path: String, redirect_to: String },
}

/// Owns the stored credential pair and broadcasts session changes.
///
/// Clones share the same store and event channel.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self { store, events }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::new()))
    }

    fn read(&self, key: CredentialKey) -> Result<Option<String>, SessionError> {
        Ok(self.store.get(key)?.filter(|value| !value.is_empty()))
    }

    pub fn get_access_token(&self) -> Result<Option<String>, SessionError> {
        self.read(CredentialKey::AccessToken)
    }

    pub fn get_refresh_token(&self) -> Result<Option<String>, SessionError> {
        self.read(CredentialKey::RefreshToken)
    }

    pub fn set_tokens(&self, pair: &TokenPair) -> Result<(), SessionError> {
        self.store.set(CredentialKey::AccessToken, &pair.access_token)?;
        self.store.set(CredentialKey::RefreshToken, &pair.refresh_token)?;
        Ok(())
    }

    /// Stores the pair returned by a login.
    pub fn sign_in(&self, pair: &TokenPair) -> Result<(), SessionError> {
        self.set_tokens(pair)?;
        info!("Signed in, credentials stored");
        self.emit(SessionEvent::SignedIn);
        Ok(())
    }

    /// Replaces the stored pair with a rotated one.
    pub fn rotate(&self, pair: &TokenPair) -> Result<(), SessionError> {
        self.set_tokens(pair)?;
        info!("Access token reissued, rotated credentials stored");
        self.emit(SessionEvent::Refreshed);
        Ok(())
    }

    /// Removes both tokens. Both removals are attempted even if the first fails.
    pub fn clear(&self) -> Result<(), SessionError> {
        let access = self.store.remove(CredentialKey::AccessToken);
        let refresh = self.store.remove(CredentialKey::RefreshToken);
        access.and(refresh)
    }

    pub fn sign_out(&self) -> Result<(), SessionError> {
        let cleared = self.clear();
        self.emit(SessionEvent::SignedOut);
        cleared
    }

    /// Ends the session: clears credentials and tells listeners to go to `redirect_to`.
    pub fn expire(&self, reason: &str, redirect_to: &str) -> Result<(), SessionError> {
        warn!("Session ended: {}", reason);
        let cleared = self.clear();
        self.emit(SessionEvent::Expired {
            reason: reason.to_string(),
            redirect_to: redirect_to.to_string(),
        });
        cleared
    }

    pub fn deny_access(&self, path: &str, redirect_to: &str) {
        self.emit(SessionEvent::AccessDenied {
            path: path.to_string(),
            redirect_to: redirect_to.to_string(),
        });
    }

    /// Decodes the currently stored access token, if any.
    pub fn claims(&self) -> Result<Option<TokenClaims>, SessionError> {
        match self.get_access_token()? {
            Some(token) => Ok(Some(decode_claims(&token)?)),
            None => Ok(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}
