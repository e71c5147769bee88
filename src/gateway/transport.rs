// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP transport used by the router to reach gateway endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::config::ConfigError;

/// A failed gateway call, as seen by error classifiers.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct UpstreamFailure {
    /// HTTP status, when the gateway answered at all.
    pub status: Option<u16>,
    /// The gateway's `error` field, or the transport error text.
    pub message: String,
}

impl UpstreamFailure {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Executes a single gateway request and returns the raw JSON body.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Value, UpstreamFailure>;

    async fn post(&self, url: &Url, body: &Value) -> Result<Value, UpstreamFailure>;
}

/// reqwest-backed transport with a per-call timeout.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    async fn read(response: reqwest::Response) -> Result<Value, UpstreamFailure> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UpstreamFailure::new(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(UpstreamFailure::new(
                Some(status.as_u16()),
                error_message(&text).unwrap_or_else(|| format!("HTTP {status} from gateway")),
            ));
        }

        serde_json::from_str(&text).map_err(|e| {
            UpstreamFailure::new(
                Some(status.as_u16()),
                format!("Invalid JSON from gateway: {e}"),
            )
        })
    }
}

/// Pull the gateway's `error` field out of a failure body.
fn error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<Value, UpstreamFailure> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| UpstreamFailure::new(e.status().map(|s| s.as_u16()), e.to_string()))?;
        Self::read(response).await
    }

    async fn post(&self, url: &Url, body: &Value) -> Result<Value, UpstreamFailure> {
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| UpstreamFailure::new(e.status().map(|s| s.as_u16()), e.to_string()))?;
        Self::read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn transport() -> ReqwestTransport {
        ReqwestTransport::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn get_returns_json_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/network/status/0")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"data": {"status": {"erd_nonce": 10}}, "code": "successful"}).to_string())
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/network/status/0", server.url())).unwrap();
        let body = transport().get(&url).await.unwrap();

        assert_eq!(body["data"]["status"]["erd_nonce"], 10);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/transaction/send")
            .match_body(Matcher::Json(json!({"nonce": 3})))
            .with_status(200)
            .with_body(json!({"data": {"txHash": "abc"}}).to_string())
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/transaction/send", server.url())).unwrap();
        let body = transport().post(&url, &json!({"nonce": 3})).await.unwrap();

        assert_eq!(body["data"]["txHash"], "abc");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_carries_gateway_message() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/transaction/ff")
            .with_status(404)
            .with_body(json!({"data": null, "error": "transaction not found", "code": "internal_issue"}).to_string())
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/transaction/ff", server.url())).unwrap();
        let failure = transport().get(&url).await.unwrap_err();

        assert_eq!(failure.status, Some(404));
        assert_eq!(failure.message, "transaction not found");
    }

    #[tokio::test]
    async fn error_status_without_json_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/about")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/about", server.url())).unwrap();
        let failure = transport().get(&url).await.unwrap_err();

        assert_eq!(failure.status, Some(502));
        assert!(failure.message.contains("502"));
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":"account was not found"}"#).as_deref(),
            Some("account was not found")
        );
        assert_eq!(error_message(r#"{"error":""}"#), None);
        assert_eq!(error_message("plain"), None);
    }
}
