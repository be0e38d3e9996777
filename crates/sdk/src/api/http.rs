use reqwest::{
    Client, Response, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use stockroom_core::SessionManager;
use tracing::debug;

use crate::api::{
    refresh::RefreshCoordinator,
    request::RequestDescriptor,
    types::{ApiBaseConfig, ApiResult, ApiSdkError},
};

fn join_url(server_url: &str, endpoint: &str) -> String {
    format!("{}/{}", server_url.trim_end_matches('/'), endpoint.trim_start_matches('/'))
}

/// HTTP client that attaches the stored bearer token and recovers from an expired
/// access token by reissuing it once and replaying the request.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_config: ApiBaseConfig,
    session: SessionManager,
    refresh: RefreshCoordinator,
}

impl HttpClient {
    pub fn new(base_config: ApiBaseConfig, session: SessionManager) -> ApiResult<Self> {
        let client = Client::builder().timeout(base_config.timeout).build()?;
        let refresh = RefreshCoordinator::new(
            client.clone(),
            join_url(&base_config.server_url, &base_config.reissue_path),
            base_config.login_route.clone(),
            session.clone(),
        );

        Ok(Self { client, base_config, session, refresh })
    }

    pub fn base_config(&self) -> &ApiBaseConfig {
        &self.base_config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    fn build_url(&self, endpoint: &str) -> String {
        join_url(&self.base_config.server_url, endpoint)
    }

    fn build_headers(
        &self,
        request: &RequestDescriptor,
        access_token: Option<&str>,
    ) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = access_token {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
        }

        for (key, value) in request.headers() {
            // the session's bearer token wins, also on the replay after a reissue
            if *key == AUTHORIZATION && access_token.is_some() {
                continue;
            }
            headers.insert(key.clone(), value.clone());
        }

        Ok(headers)
    }

    fn stored_token(&self, request: &RequestDescriptor) -> ApiResult<Option<String>> {
        if request.is_authenticated() { Ok(self.session.get_access_token()?) } else { Ok(None) }
    }

    /// Sends the request once with `access_token` as the bearer credential.
    async fn dispatch(
        &self,
        request: &RequestDescriptor,
        access_token: Option<&str>,
    ) -> ApiResult<Response> {
        let url = self.build_url(request.endpoint());
        let headers = self.build_headers(request, access_token)?;

        debug!("{} {}", request.method(), url);
        let mut builder = self.client.request(request.method().clone(), &url).headers(headers);
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    async fn check_status(
        &self,
        request: &RequestDescriptor,
        response: Response,
    ) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiSdkError::Unauthorized { endpoint: request.endpoint().to_string() });
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiSdkError::Status { endpoint: request.endpoint().to_string(), status, body })
    }

    /// Sends a request, reissuing the access token and replaying once on a 401.
    pub async fn execute(&self, mut request: RequestDescriptor) -> ApiResult<Response> {
        let sent_with = self.stored_token(&request)?;
        let response = self.dispatch(&request, sent_with.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || !request.can_refresh() {
            return self.check_status(&request, response).await;
        }

        request.mark_retried();
        debug!("{} answered 401, recovering session", request.endpoint());

        let access_token = match self.refresh.recover(sent_with.as_deref()).await {
            Ok(access_token) => access_token,
            Err(error) => {
                debug!("Not replaying {}: {}", request.endpoint(), error);
                return Err(ApiSdkError::Unauthorized {
                    endpoint: request.endpoint().to_string(),
                });
            }
        };

        let response = self.dispatch(&request, Some(&access_token)).await?;
        self.check_status(&request, response).await
    }

    pub async fn execute_json<T>(&self, request: RequestDescriptor) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(request).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn execute_status(&self, request: RequestDescriptor) -> ApiResult<()> {
        self.execute(request).await?;
        Ok(())
    }

    pub async fn get<T>(&self, endpoint: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_json(RequestDescriptor::get(endpoint)).await
    }

    pub async fn get_with_query<T, Q>(&self, endpoint: &str, query: Option<Q>) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize,
    {
        let mut request = RequestDescriptor::get(endpoint);
        if let Some(q) = query {
            request = request.with_query(&q)?;
        }

        self.execute_json(request).await
    }

    pub async fn get_status(&self, endpoint: &str) -> ApiResult<()> {
        self.execute_status(RequestDescriptor::get(endpoint)).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        self.execute_json(RequestDescriptor::post(endpoint).with_json(body)?).await
    }

    pub async fn post_status<B>(&self, endpoint: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize,
    {
        self.execute_status(RequestDescriptor::post(endpoint).with_json(body)?).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        self.execute_json(RequestDescriptor::put(endpoint).with_json(body)?).await
    }

    pub async fn put_status<B>(&self, endpoint: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize,
    {
        self.execute_status(RequestDescriptor::put(endpoint).with_json(body)?).await
    }

    pub async fn delete<T>(&self, endpoint: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_json(RequestDescriptor::delete(endpoint)).await
    }

    pub async fn delete_status(&self, endpoint: &str) -> ApiResult<()> {
        self.execute_status(RequestDescriptor::delete(endpoint)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use reqwest::header::HeaderName;
    use serde_json::{Value, json};
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };
    use stockroom_core::{
        CredentialStore, MemoryCredentialStore, SessionError, TokenPair, session::CredentialKey,
    };

    fn client(server_url: &str, session: &SessionManager) -> HttpClient {
        let config = ApiBaseConfig::new(format!("{}/api/", server_url));
        HttpClient::new(config, session.clone()).unwrap()
    }

    #[test]
    fn joins_urls_without_duplicate_slashes() {
        assert_eq!(join_url("http://localhost:8080/api/", "/orders"), "http://localhost:8080/api/orders");
        assert_eq!(join_url("http://localhost:8080/api", "orders"), "http://localhost:8080/api/orders");
    }

    #[tokio::test]
    async fn attaches_bearer_token_when_stored() {
        let mut server = mockito::Server::new_async().await;
        let orders = server
            .mock("GET", "/api/orders")
            .match_header("authorization", "Bearer at-1")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1}]"#)
            .create_async()
            .await;

        let session = SessionManager::in_memory();
        session.set_tokens(&TokenPair::new("at-1", "rt-1")).unwrap();

        let body: Value = client(&server.url(), &session).get("orders").await.unwrap();

        orders.assert_async().await;
        assert_eq!(body, json!([{ "id": 1 }]));
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let mut server = mockito::Server::new_async().await;
        let notices = server
            .mock("GET", "/api/notices")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let session = SessionManager::in_memory();
        session.set_tokens(&TokenPair::new("", "")).unwrap();

        let body: Vec<Value> = client(&server.url(), &session).get("notices").await.unwrap();

        notices.assert_async().await;
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn per_call_headers_override_defaults() {
        let mut server = mockito::Server::new_async().await;
        let upload = server
            .mock("POST", "/api/lots/import")
            .match_header("content-type", "text/csv")
            .with_status(204)
            .create_async()
            .await;

        let session = SessionManager::in_memory();
        let request = RequestDescriptor::post("lots/import")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/csv"))
            .with_header(HeaderName::from_static("x-request-source"), HeaderValue::from_static("cli"));

        client(&server.url(), &session).execute_status(request).await.unwrap();

        upload.assert_async().await;
    }

    #[tokio::test]
    async fn sends_query_pairs() {
        let mut server = mockito::Server::new_async().await;
        let lots = server
            .mock("GET", "/api/lots")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("status".into(), "ACTIVE".into()),
                Matcher::UrlEncoded("page".into(), "2".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let session = SessionManager::in_memory();
        let _: Vec<Value> = client(&server.url(), &session)
            .get_with_query("lots", Some(json!({ "status": "ACTIVE", "page": 2, "sku": null })))
            .await
            .unwrap();

        lots.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_carries_body() {
        let mut server = mockito::Server::new_async().await;
        let _conflict = server
            .mock("DELETE", "/api/discard/9")
            .with_status(409)
            .with_body("discard already approved")
            .create_async()
            .await;

        let session = SessionManager::in_memory();
        let result = client(&server.url(), &session).delete_status("discard/9").await;

        match result {
            Err(ApiSdkError::Status { endpoint, status, body }) => {
                assert_eq!(endpoint, "discard/9");
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(body, "discard already approved");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn unauthenticated_request_is_not_recovered() {
        let mut server = mockito::Server::new_async().await;
        let reissue = server.mock("POST", "/api/auth/reissue").expect(0).create_async().await;
        let _login = server.mock("POST", "/api/auth/login").with_status(401).create_async().await;

        let session = SessionManager::in_memory();
        session.set_tokens(&TokenPair::new("at-1", "rt-1")).unwrap();
        let request = RequestDescriptor::post("auth/login")
            .unauthenticated()
            .with_json(&json!({ "email": "kim@stockroom.test", "password": "wrong" }))
            .unwrap();

        let result = client(&server.url(), &session).execute(request).await;

        reissue.assert_async().await;
        assert!(result.unwrap_err().is_unauthorized());
        assert_eq!(session.get_refresh_token().unwrap().as_deref(), Some("rt-1"));
    }

    const ROTATED: &str = r#"{"success":true,"data":{"accessToken":"at-2","refreshToken":"rt-2"}}"#;

    async fn mock_reissue(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/api/auth/reissue")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ROTATED)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn caller_authorization_never_replaces_the_session_token() {
        let mut server = mockito::Server::new_async().await;
        let caller = server
            .mock("GET", "/api/orders")
            .match_header("authorization", "Bearer caller-token")
            .expect(0)
            .create_async()
            .await;
        let _stale = server
            .mock("GET", "/api/orders")
            .match_header("authorization", "Bearer at-1")
            .with_status(401)
            .create_async()
            .await;
        let fresh = server
            .mock("GET", "/api/orders")
            .match_header("authorization", "Bearer at-2")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let _reissue = mock_reissue(&mut server).await;

        let session = SessionManager::in_memory();
        session.set_tokens(&TokenPair::new("at-1", "rt-1")).unwrap();
        let request = RequestDescriptor::get("orders")
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer caller-token"));

        client(&server.url(), &session).execute_status(request).await.unwrap();

        caller.assert_async().await;
        fresh.assert_async().await;
    }

    /// Memory store that loses the access token as soon as a rotated one is written,
    /// as if another task cleared it right after the reissue.
    #[derive(Default)]
    struct ClearedAfterRotation {
        inner: MemoryCredentialStore,
        rotated: AtomicBool,
    }

    impl CredentialStore for ClearedAfterRotation {
        fn get(&self, key: CredentialKey) -> Result<Option<String>, SessionError> {
            if key == CredentialKey::AccessToken && self.rotated.load(Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.get(key)
        }

        fn set(&self, key: CredentialKey, value: &str) -> Result<(), SessionError> {
            if key == CredentialKey::AccessToken && value == "at-2" {
                self.rotated.store(true, Ordering::SeqCst);
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: CredentialKey) -> Result<(), SessionError> {
            self.inner.remove(key)
        }
    }

    #[tokio::test]
    async fn replay_carries_the_reissued_token() {
        let mut server = mockito::Server::new_async().await;
        let _stale = server
            .mock("GET", "/api/orders")
            .match_header("authorization", "Bearer at-1")
            .with_status(401)
            .create_async()
            .await;
        let fresh = server
            .mock("GET", "/api/orders")
            .match_header("authorization", "Bearer at-2")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let _reissue = mock_reissue(&mut server).await;

        let session = SessionManager::new(Arc::new(ClearedAfterRotation::default()));
        session.set_tokens(&TokenPair::new("at-1", "rt-1")).unwrap();

        client(&server.url(), &session).get_status("orders").await.unwrap();

        fresh.assert_async().await;
    }
}
