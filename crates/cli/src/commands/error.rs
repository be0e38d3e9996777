use thiserror::Error;

/// Errors that can occur while locating and loading the project configuration
#[derive(Error, Debug)]
pub enum ProjectLocationError {
    #[error("Project configuration error: {0}")]
    ProjectConfig(String),

    #[error("Could not create client: {0}")]
    Client(#[from] stockroom::ApiSdkError),
}

/// Errors that can occur during sign in and sign out
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Sign in failed: {0}")]
    SignIn(stockroom::ApiSdkError),

    #[error("Sign out failed: {0}")]
    SignOut(stockroom::ApiSdkError),

    #[error("Terminal interaction failed: {0}")]
    Terminal(#[from] dialoguer::Error),

    #[error("Session error: {0}")]
    Session(#[from] stockroom_core::SessionError),
}

/// Errors that can occur while sending a request through the session
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Invalid JSON body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("Request failed: {0}")]
    Api(#[from] stockroom::ApiSdkError),
}

/// Errors that can occur while evaluating a navigation
#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Session error: {0}")]
    Session(#[from] stockroom_core::SessionError),
}
