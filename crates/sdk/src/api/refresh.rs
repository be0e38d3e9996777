use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use serde::Serialize;
use stockroom_core::{SessionError, SessionManager, TokenPair};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::types::ApiResponse;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("No refresh token stored")]
    MissingRefreshToken,

    #[error("Session already ended")]
    SessionEnded,

    #[error("Token reissue rejected: {0}")]
    Rejected(String),

    #[error("Token reissue request failed: {0}")]
    Transport(String),

    #[error("Could not access stored credentials: {0}")]
    Storage(String),
}

impl From<SessionError> for RefreshError {
    fn from(value: SessionError) -> Self {
        RefreshError::Storage(value.to_string())
    }
}

#[derive(Serialize)]
struct ReissueRequest<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

type SharedReissue = Shared<BoxFuture<'static, Result<TokenPair, RefreshError>>>;

/// Makes sure concurrent 401s share a single reissue call.
#[derive(Clone)]
pub struct RefreshCoordinator {
    transport: Client,
    reissue_url: String,
    login_route: String,
    session: SessionManager,
    in_flight: Arc<Mutex<Option<SharedReissue>>>,
}

impl RefreshCoordinator {
    /// `transport` is used as is: no bearer header and no retry handling.
    pub fn new(
        transport: Client,
        reissue_url: String,
        login_route: String,
        session: SessionManager,
    ) -> Self {
        Self { transport, reissue_url, login_route, session, in_flight: Arc::new(Mutex::new(None)) }
    }

    /// Recovers from a 401 received for a request sent with `stale_token`.
    ///
    /// Joins a reissue already in flight, reuses a token rotated since the request
    /// went out, or starts a new reissue. Returns the access token to retry with.
    pub async fn recover(&self, stale_token: Option<&str>) -> Result<String, RefreshError> {
        let reissue = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(reissue) => {
                    debug!("Joining token reissue already in flight");
                    reissue.clone()
                }
                None => {
                    match (self.session.get_access_token()?, stale_token) {
                        (Some(current), Some(stale)) if current != stale => {
                            debug!("Access token rotated while the request was in flight");
                            return Ok(current);
                        }
                        (None, Some(_)) => return Err(RefreshError::SessionEnded),
                        _ => {}
                    }

                    let reissue = self.clone().reissue().boxed().shared();
                    *slot = Some(reissue.clone());
                    reissue
                }
            }
        };

        reissue.await.map(|pair| pair.access_token)
    }

    async fn reissue(self) -> Result<TokenPair, RefreshError> {
        let result = match self.request_rotation().await {
            Ok(pair) => self.session.rotate(&pair).map(|_| pair).map_err(RefreshError::from),
            Err(error) => Err(error),
        };

        if let Err(error) = &result {
            warn!("Token reissue failed, ending session: {}", error);
            if let Err(clear_error) = self.session.expire(&error.to_string(), &self.login_route) {
                warn!("Failed to clear credentials: {}", clear_error);
            }
        }

        self.in_flight.lock().await.take();
        result
    }

    async fn request_rotation(&self) -> Result<TokenPair, RefreshError> {
        let refresh_token =
            self.session.get_refresh_token()?.ok_or(RefreshError::MissingRefreshToken)?;

        debug!("Requesting access token reissue from {}", self.reissue_url);
        let response = self
            .transport
            .post(&self.reissue_url)
            .json(&ReissueRequest { refresh_token: &refresh_token })
            .send()
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Rejected(format!("reissue endpoint returned {}", status)));
        }

        let envelope: ApiResponse<TokenPair> =
            response.json().await.map_err(|e| RefreshError::Rejected(e.to_string()))?;

        envelope.into_data().map_err(RefreshError::Rejected)
    }
}
