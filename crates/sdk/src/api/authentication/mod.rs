use serde::{Deserialize, Serialize};
use stockroom_core::TokenPair;
use tracing::warn;

use crate::api::{
    http::HttpClient,
    request::RequestDescriptor,
    types::{ApiResponse, ApiResult, ApiSdkError},
};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// The login endpoint answers either with the usual envelope or with a bare pair.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginResponse {
    Envelope(ApiResponse<TokenPair>),
    Bare(TokenPair),
}

impl LoginResponse {
    fn into_pair(self) -> ApiResult<TokenPair> {
        match self {
            LoginResponse::Envelope(envelope) => envelope.into_data().map_err(ApiSdkError::Rejected),
            LoginResponse::Bare(pair) => Ok(pair),
        }
    }
}

#[derive(Clone)]
pub struct AuthenticationApi {
    client: HttpClient,
}

impl AuthenticationApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Signs in and stores the returned credential pair.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<TokenPair> {
        let request = RequestDescriptor::post(&self.client.base_config().login_path)
            .unauthenticated()
            .with_json(&LoginRequest { email, password })?;

        let response: LoginResponse = self.client.execute_json(request).await?;
        let pair = response.into_pair()?;

        self.client.session().sign_in(&pair)?;
        Ok(pair)
    }

    /// Tells the server to end the session, then clears local credentials even if
    /// the server call failed.
    pub async fn logout(&self) -> ApiResult<()> {
        let request = RequestDescriptor::post(&self.client.base_config().logout_path);
        if let Err(error) = self.client.execute_status(request).await {
            warn!("Logout request failed, clearing local credentials anyway: {}", error);
        }

        self.client.session().sign_out()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ApiBaseConfig;
    use mockito::Matcher;
    use serde_json::json;
    use stockroom_core::{SessionEvent, SessionManager};

    fn api(server_url: &str, session: &SessionManager) -> AuthenticationApi {
        let config = ApiBaseConfig::new(format!("{}/api", server_url));
        AuthenticationApi::new(HttpClient::new(config, session.clone()).unwrap())
    }

    #[tokio::test]
    async fn login_stores_pair_from_envelope() {
        let mut server = mockito::Server::new_async().await;
        let login = server
            .mock("POST", "/api/auth/login")
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::Json(json!({ "email": "kim@stockroom.test", "password": "pw" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"data":{"accessToken":"at-1","refreshToken":"rt-1"}}"#)
            .create_async()
            .await;

        let session = SessionManager::in_memory();
        let mut events = session.subscribe();

        let pair = api(&server.url(), &session).login("kim@stockroom.test", "pw").await.unwrap();

        login.assert_async().await;
        assert_eq!(pair, TokenPair::new("at-1", "rt-1"));
        assert_eq!(session.get_access_token().unwrap().as_deref(), Some("at-1"));
        assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedIn);
    }

    #[tokio::test]
    async fn login_accepts_bare_pair() {
        let mut server = mockito::Server::new_async().await;
        let _login = server
            .mock("POST", "/api/auth/login")
            .with_status(200)
            .with_body(r#"{"accessToken":"at-1","refreshToken":"rt-1"}"#)
            .create_async()
            .await;

        let session = SessionManager::in_memory();
        api(&server.url(), &session).login("kim@stockroom.test", "pw").await.unwrap();

        assert_eq!(session.get_refresh_token().unwrap().as_deref(), Some("rt-1"));
    }

    #[tokio::test]
    async fn rejected_login_stores_nothing() {
        let mut server = mockito::Server::new_async().await;
        let _login = server
            .mock("POST", "/api/auth/login")
            .with_status(200)
            .with_body(r#"{"success":false,"message":"account awaiting approval"}"#)
            .create_async()
            .await;

        let session = SessionManager::in_memory();
        let result = api(&server.url(), &session).login("kim@stockroom.test", "pw").await;

        assert!(matches!(result, Err(ApiSdkError::Rejected(message)) if message == "account awaiting approval"));
        assert_eq!(session.get_access_token().unwrap(), None);
    }

    #[tokio::test]
    async fn logout_clears_credentials_even_when_server_fails() {
        let mut server = mockito::Server::new_async().await;
        let logout = server
            .mock("POST", "/api/auth/logout")
            .match_header("authorization", "Bearer at-1")
            .with_status(500)
            .create_async()
            .await;

        let session = SessionManager::in_memory();
        session.set_tokens(&TokenPair::new("at-1", "rt-1")).unwrap();
        let mut events = session.subscribe();

        api(&server.url(), &session).logout().await.unwrap();

        logout.assert_async().await;
        assert_eq!(session.get_access_token().unwrap(), None);
        assert_eq!(session.get_refresh_token().unwrap(), None);
        assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedOut);
    }
}
