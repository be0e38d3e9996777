use clap::ValueEnum;
use serde_json::Value;
use stockroom::{ApiSdkError, Client, RequestDescriptor};
use tracing::debug;

use crate::{commands::error::RequestError, console::print_success_message};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Builds the request for `endpoint`, parsing `body` as JSON when given.
pub fn build_request(
    method: HttpMethod,
    endpoint: &str,
    body: Option<&str>,
) -> Result<RequestDescriptor, RequestError> {
    let request = match method {
        HttpMethod::Get => RequestDescriptor::get(endpoint),
        HttpMethod::Post => RequestDescriptor::post(endpoint),
        HttpMethod::Put => RequestDescriptor::put(endpoint),
        HttpMethod::Delete => RequestDescriptor::delete(endpoint),
    };

    match body {
        Some(body) => {
            let json: Value = serde_json::from_str(body)?;
            Ok(request.with_json(&json)?)
        }
        None => Ok(request),
    }
}

pub async fn handle_request(
    method: HttpMethod,
    endpoint: &str,
    body: Option<&str>,
    client: &Client,
) -> Result<(), RequestError> {
    let request = build_request(method, endpoint, body)?;

    let response = client.http().execute(request).await?;
    let status = response.status();
    debug!("{:?} {} answered {}", method, endpoint, status);
    let text = response.text().await.map_err(ApiSdkError::from)?;

    if text.trim().is_empty() {
        print_success_message(&format!("✅ {}", status));
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_parsed_as_json() {
        let request =
            build_request(HttpMethod::Post, "inquiries", Some(r#"{"title":"Late delivery"}"#))
                .unwrap();

        assert_eq!(request.method().as_str(), "POST");
        assert_eq!(request.body().unwrap()["title"], "Late delivery");
    }

    #[test]
    fn invalid_body_is_rejected() {
        let result = build_request(HttpMethod::Put, "mypage", Some("{not json"));

        assert!(matches!(result, Err(RequestError::InvalidBody(_))));
    }
}
