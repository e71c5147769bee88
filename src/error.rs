// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::cache::StoreError;
use crate::gateway::UpstreamFailure;

/// Errors surfaced by the routing core and the faucet.
///
/// A classified "not found" answer from the gateway never shows up here: the
/// router turns it into an absent result instead.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Malformed input, rejected before any gateway call.
    #[error("{0}")]
    Validation(String),

    /// Unclassified gateway or transport failure.
    #[error("Gateway request failed: {0}")]
    Upstream(#[from] UpstreamFailure),

    /// Claim attempted inside the cooldown window.
    #[error("{0}")]
    RateLimitExceeded(String),

    /// Request is well formed but refused by policy.
    #[error("{0}")]
    NotAcceptable(String),

    /// The faucet nonce could not be bootstrapped from chain state.
    #[error("Nonce allocation failed: {0}")]
    Allocation(String),

    #[error("Cache store error: {0}")]
    Store(#[from] StoreError),

    #[error("Deep history gateway is not configured")]
    DeepHistoryUnavailable,

    #[error("Faucet is disabled")]
    FaucetDisabled,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_acceptable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_ACCEPTABLE, message)
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        let message = err.to_string();
        match err {
            ProxyError::Validation(_) => Self::bad_request(message),
            ProxyError::RateLimitExceeded(_) => Self::too_many_requests(message),
            ProxyError::NotAcceptable(_) => Self::not_acceptable(message),
            ProxyError::Upstream(_) => Self::bad_gateway(message),
            ProxyError::Allocation(_)
            | ProxyError::Store(_)
            | ProxyError::DeepHistoryUnavailable
            | ProxyError::FaucetDisabled => Self::service_unavailable(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let slow = ApiError::too_many_requests("later");
        assert_eq!(slow.status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn proxy_errors_map_to_status_codes() {
        let cases = [
            (ProxyError::Validation("bad address".into()), StatusCode::BAD_REQUEST),
            (
                ProxyError::RateLimitExceeded("cooldown".into()),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ProxyError::NotAcceptable("too rich".into()),
                StatusCode::NOT_ACCEPTABLE,
            ),
            (
                ProxyError::Upstream(UpstreamFailure::new(Some(500), "boom")),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ProxyError::Allocation("chain down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ProxyError::FaucetDisabled, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }
}
