use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use stockroom_core::{ClientConfig, SessionError};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ApiBaseConfig {
    pub server_url: String,
    pub timeout: Duration,
    pub reissue_path: String,
    pub login_path: String,
    pub logout_path: String,
    /// Client route the application is sent to when the session ends.
    pub login_route: String,
}

impl ApiBaseConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        ApiBaseConfig::from(&ClientConfig::default()).with_server_url(server_url)
    }

    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }
}

impl From<&ClientConfig> for ApiBaseConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            server_url: config.api.base_url.clone(),
            timeout: Duration::from_millis(config.api.timeout_ms),
            reissue_path: config.api.reissue_path.clone(),
            login_path: config.api.login_path.clone(),
            logout_path: config.api.logout_path.clone(),
            login_route: config.routes.login.clone(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiSdkError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unauthorized request to {endpoint}")]
    Unauthorized { endpoint: String },

    #[error("Request to {endpoint} failed with status {status}: {body}")]
    Status { endpoint: String, status: StatusCode, body: String },

    #[error("Request rejected by server: {0}")]
    Rejected(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),
}

impl ApiSdkError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiSdkError::Unauthorized { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiSdkError>;

/// Response envelope used by the backend: `{ success, data, message }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Returns `data` for a successful envelope, otherwise the server's message.
    pub fn into_data(self) -> Result<T, String> {
        match self {
            ApiResponse { success: true, data: Some(data), .. } => Ok(data),
            ApiResponse { success: true, data: None, .. } => {
                Err("response was successful but carried no data".to_string())
            }
            ApiResponse { message, .. } => {
                Err(message.unwrap_or_else(|| "request was not successful".to_string()))
            }
        }
    }
}
