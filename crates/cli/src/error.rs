use thiserror::Error;

use crate::commands::error::{AuthError, NavigationError, ProjectLocationError, RequestError};

/// Top-level CLI error that composes all module-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Project location error: {0}")]
    ProjectLocation(#[from] ProjectLocationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<String> for CliError {
    fn from(err: String) -> Self {
        CliError::Internal(err)
    }
}
