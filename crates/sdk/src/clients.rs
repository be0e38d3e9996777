use std::sync::Arc;

use stockroom_core::{
    ClientConfig, FileCredentialStore, NavigationGuard, SessionEvent, SessionManager,
    session::default_storage_dir,
};
use tokio::sync::broadcast;

use crate::api::{ApiBaseConfig, ApiResult, ApiSdkError, AuthenticationApi, http::HttpClient};

/// Entry point tying the HTTP client, authentication calls and navigation guard
/// to one session.
#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    authentication_api: AuthenticationApi,
    navigation: NavigationGuard,
    session: SessionManager,
}

impl Client {
    pub fn new(config: &ClientConfig, session: SessionManager) -> ApiResult<Self> {
        config.validate().map_err(ApiSdkError::ConfigError)?;

        let http = HttpClient::new(ApiBaseConfig::from(config), session.clone())?;

        Ok(Self {
            authentication_api: AuthenticationApi::new(http.clone()),
            navigation: NavigationGuard::from_config(session.clone(), &config.routes),
            http,
            session,
        })
    }

    /// Builds a client whose credentials live in the profile file named by the config.
    pub fn with_file_credentials(config: &ClientConfig) -> ApiResult<Self> {
        let storage_dir = match &config.credentials.storage_dir {
            Some(dir) => dir.clone(),
            None => default_storage_dir()?,
        };

        let store = FileCredentialStore::new(&storage_dir, &config.credentials.profile);
        Self::new(config, SessionManager::new(Arc::new(store)))
    }

    pub fn auth(&self) -> &AuthenticationApi {
        &self.authentication_api
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn navigation(&self) -> &NavigationGuard {
        &self.navigation
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }
}
