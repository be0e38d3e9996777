use reqwest::{
    Method,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;
use serde_json::Value;

use crate::api::types::{ApiResult, ApiSdkError};

/// An outgoing request kept around so it can be replayed once after a token reissue.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    endpoint: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    headers: HeaderMap,
    authenticated: bool,
    retried: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, endpoint: &str) -> Self {
        Self {
            method,
            endpoint: endpoint.to_string(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            authenticated: true,
            retried: false,
        }
    }

    pub fn get(endpoint: &str) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: &str) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: &str) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn delete(endpoint: &str) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    pub fn with_json<B: Serialize>(mut self, body: &B) -> ApiResult<Self> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiSdkError::SerializationError(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    /// Flattens a serializable struct or map into query pairs. `None` fields are skipped.
    pub fn with_query<Q: Serialize>(mut self, query: &Q) -> ApiResult<Self> {
        let value = serde_json::to_value(query)
            .map_err(|e| ApiSdkError::SerializationError(e.to_string()))?;

        let Value::Object(fields) = value else {
            return Err(ApiSdkError::SerializationError(
                "query must serialize to a map of fields".to_string(),
            ));
        };

        for (key, value) in fields {
            match value {
                Value::Null => {}
                Value::String(text) => self.query.push((key, text)),
                other => self.query.push((key, other.to_string())),
            }
        }

        Ok(self)
    }

    /// Per-call header, applied after the default and bearer headers.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sends without a bearer token and never triggers a token reissue.
    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn can_refresh(&self) -> bool {
        self.authenticated && !self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}
