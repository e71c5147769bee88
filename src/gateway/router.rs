// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Endpoint selection and request execution.
//!
//! ## Routing precedence
//!
//! 1. **Deep history** - the context carries a block nonce and the kind is
//!    deep-history eligible. The URL gains a `blockNonce` query parameter.
//! 2. **Snapshotless** - the kind is snapshotless eligible. Falls back to the
//!    default endpoint when no snapshotless endpoint is configured.
//! 3. **Default** - everything else.
//!
//! ## Response envelope
//!
//! Gateway bodies look like `{"data": <payload>, "error": "", "code": "..."}`.
//! Deep-history answers may carry `data.blockInfo`, which is copied into the
//! operation's context after every successful deep-history call.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use super::context::OperationContext;
use super::kind::OperationKind;
use super::transport::{HttpTransport, UpstreamFailure};
use crate::config::GatewayEndpoints;
use crate::error::ProxyError;

/// Decides whether a failed call means "absent" rather than an error.
pub struct ErrorClassifier(Box<dyn Fn(&UpstreamFailure) -> bool + Send + Sync>);

impl ErrorClassifier {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&UpstreamFailure) -> bool + Send + Sync + 'static,
    {
        Self(Box::new(predicate))
    }

    /// Matches failures whose message contains `needle`.
    pub fn message_contains(needle: &'static str) -> Self {
        Self::new(move |failure| failure.message.contains(needle))
    }

    /// Matches failures whose message is exactly `expected`.
    pub fn message_equals(expected: &'static str) -> Self {
        Self::new(move |failure| failure.message == expected)
    }

    pub fn matches(&self, failure: &UpstreamFailure) -> bool {
        (self.0)(failure)
    }
}

/// Routes gateway calls to the right endpoint and threads the operation
/// context through them.
pub struct RequestRouter {
    endpoints: GatewayEndpoints,
    transport: Arc<dyn HttpTransport>,
}

impl RequestRouter {
    pub fn new(endpoints: GatewayEndpoints, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoints,
            transport,
        }
    }

    fn uses_deep_history(kind: OperationKind, context: &OperationContext) -> Option<u64> {
        if !kind.policy().uses_deep_history_endpoint {
            return None;
        }
        context.deep_history_block_nonce()
    }

    /// Pick the endpoint for `kind` under `context`.
    pub fn resolve_base_url(
        &self,
        kind: OperationKind,
        context: &OperationContext,
    ) -> Result<&Url, ProxyError> {
        if Self::uses_deep_history(kind, context).is_some() {
            return self
                .endpoints
                .deep_history
                .as_ref()
                .ok_or(ProxyError::DeepHistoryUnavailable);
        }

        if kind.policy().uses_snapshotless_endpoint {
            return Ok(self
                .endpoints
                .snapshotless
                .as_ref()
                .unwrap_or(&self.endpoints.default));
        }

        Ok(&self.endpoints.default)
    }

    /// Full request URL for `path` (which may carry its own query string).
    pub fn build_request(
        &self,
        kind: OperationKind,
        path: &str,
        context: &OperationContext,
    ) -> Result<Url, ProxyError> {
        let base = self.resolve_base_url(kind, context)?;
        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| ProxyError::Validation(format!("Invalid gateway path '{path}': {e}")))?;

        if let Some(block_nonce) = Self::uses_deep_history(kind, context) {
            url.query_pairs_mut()
                .append_pair("blockNonce", &block_nonce.to_string());
        }

        Ok(url)
    }

    /// GET `path` and return the envelope payload.
    pub async fn get(
        &self,
        context: &OperationContext,
        kind: OperationKind,
        path: &str,
        classifier: Option<&ErrorClassifier>,
    ) -> Result<Option<Value>, ProxyError> {
        self.execute(context, kind, path, None, classifier).await
    }

    /// POST `body` to `path` and return the envelope payload.
    pub async fn post(
        &self,
        context: &OperationContext,
        kind: OperationKind,
        path: &str,
        body: &Value,
        classifier: Option<&ErrorClassifier>,
    ) -> Result<Option<Value>, ProxyError> {
        self.execute(context, kind, path, Some(body), classifier).await
    }

    /// Execute one gateway call.
    ///
    /// Returns `Ok(None)` when the call failed and `classifier` matched the
    /// failure, or when the envelope carried no payload. Any other failure is
    /// returned unchanged.
    pub async fn execute(
        &self,
        context: &OperationContext,
        kind: OperationKind,
        path: &str,
        body: Option<&Value>,
        classifier: Option<&ErrorClassifier>,
    ) -> Result<Option<Value>, ProxyError> {
        let url = self.build_request(kind, path, context)?;
        tracing::debug!(kind = kind.as_str(), url = %url, "Gateway request");

        let result = match body {
            Some(body) => self.transport.post(&url, body).await,
            None => self.transport.get(&url).await,
        };

        let envelope = match result {
            Ok(envelope) => envelope,
            Err(failure) if classifier.is_some_and(|c| c.matches(&failure)) => {
                tracing::debug!(
                    kind = kind.as_str(),
                    error = %failure,
                    "Gateway reported absent resource"
                );
                return Ok(None);
            }
            Err(failure) => {
                tracing::warn!(
                    kind = kind.as_str(),
                    url = %url,
                    status = ?failure.status,
                    error = %failure,
                    "Gateway request failed"
                );
                return Err(failure.into());
            }
        };

        let payload = match envelope {
            Value::Object(mut fields) => fields.remove("data"),
            _ => None,
        }
        .filter(|payload| !payload.is_null());

        if Self::uses_deep_history(kind, context).is_some() {
            if let Some(block_info) = payload
                .as_ref()
                .and_then(|p| p.get("blockInfo"))
                .filter(|info| !info.is_null())
            {
                context.set_deep_history_block_info(block_info.clone());
            }
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{endpoints, FakeTransport};
    use serde_json::json;

    fn router(transport: &Arc<FakeTransport>, snapshotless: bool, deep: bool) -> RequestRouter {
        RequestRouter::new(endpoints(snapshotless, deep), transport.clone())
    }

    #[test]
    fn deep_history_kinds_route_to_deep_endpoint_with_block_nonce() {
        let transport = Arc::new(FakeTransport::new());
        let router = router(&transport, true, true);
        let context = OperationContext::at_block(12345);

        for kind in OperationKind::ALL
            .into_iter()
            .filter(|k| k.policy().uses_deep_history_endpoint)
        {
            let base = router.resolve_base_url(kind, &context).unwrap();
            assert_eq!(base.as_str(), "https://deep.test/");

            let url = router.build_request(kind, "address/x", &context).unwrap();
            assert!(url.as_str().starts_with("https://deep.test/address/x"));
            assert!(url.as_str().contains("blockNonce=12345"));
        }
    }

    #[test]
    fn without_block_nonce_no_deep_history() {
        let transport = Arc::new(FakeTransport::new());
        let router = router(&transport, false, true);
        let context = OperationContext::new();

        for kind in OperationKind::ALL {
            let url = router.build_request(kind, "address/x", &context).unwrap();
            assert!(!url.as_str().contains("blockNonce"));
            assert!(!url.as_str().starts_with("https://deep.test"));
        }
    }

    #[test]
    fn block_nonce_ignored_for_ineligible_kinds() {
        let transport = Arc::new(FakeTransport::new());
        let router = router(&transport, true, true);
        let context = OperationContext::at_block(5);

        let url = router
            .build_request(OperationKind::TransactionPool, "transaction/pool", &context)
            .unwrap();
        assert_eq!(url.as_str(), "https://snapshotless.test/transaction/pool");

        let url = router
            .build_request(OperationKind::NetworkStatus, "network/status/0", &context)
            .unwrap();
        assert_eq!(url.as_str(), "https://gateway.test/network/status/0");
    }

    #[test]
    fn snapshotless_kinds_prefer_snapshotless_endpoint() {
        let transport = Arc::new(FakeTransport::new());
        let with = router(&transport, true, false);
        let without = router(&transport, false, false);
        let context = OperationContext::new();

        for kind in OperationKind::ALL {
            let expected = if kind.policy().uses_snapshotless_endpoint {
                "https://snapshotless.test/"
            } else {
                "https://gateway.test/"
            };
            assert_eq!(with.resolve_base_url(kind, &context).unwrap().as_str(), expected);
            assert_eq!(
                without.resolve_base_url(kind, &context).unwrap().as_str(),
                "https://gateway.test/"
            );
        }
    }

    #[test]
    fn missing_deep_history_endpoint_is_an_error() {
        let transport = Arc::new(FakeTransport::new());
        let router = router(&transport, true, false);
        let context = OperationContext::at_block(1);

        assert!(matches!(
            router.resolve_base_url(OperationKind::AddressDetails, &context),
            Err(ProxyError::DeepHistoryUnavailable)
        ));
    }

    #[test]
    fn path_query_is_preserved() {
        let transport = Arc::new(FakeTransport::new());
        let router = router(&transport, false, true);
        let context = OperationContext::at_block(9);

        let url = router
            .build_request(OperationKind::VmQuery, "vm-values/query?fields=a,b", &context)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://deep.test/vm-values/query?fields=a,b&blockNonce=9"
        );
    }

    #[tokio::test]
    async fn deep_history_scenario() {
        let transport = Arc::new(FakeTransport::new());
        let address = crate::address::bech32_encode(&"11".repeat(32)).unwrap();
        transport.respond(
            &format!("address/{address}"),
            json!({"data": {"account": {"address": address}, "blockInfo": {"nonce": 12345, "hash": "aa"}}}),
        );

        let router = router(&transport, true, true);
        let context = OperationContext::at_block(12345);

        let payload = router
            .get(
                &context,
                OperationKind::AddressDetails,
                &format!("address/{address}"),
                None,
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(payload["account"]["address"], address.as_str());
        assert_eq!(
            transport.requested_urls(),
            vec![format!("https://deep.test/address/{address}?blockNonce=12345")]
        );
        assert_eq!(
            context.deep_history_block_info(),
            Some(json!({"nonce": 12345, "hash": "aa"}))
        );
    }

    #[tokio::test]
    async fn block_info_not_written_without_deep_history() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            "address/a",
            json!({"data": {"blockInfo": {"nonce": 1}}}),
        );
        let router = router(&transport, false, true);
        let context = OperationContext::new();

        router
            .get(&context, OperationKind::AddressDetails, "address/a", None)
            .await
            .unwrap();

        assert!(context.deep_history_block_info().is_none());
    }

    #[tokio::test]
    async fn classified_failure_becomes_absent() {
        let transport = Arc::new(FakeTransport::new());
        transport.fail(
            "transaction/ab/process-status",
            UpstreamFailure::new(Some(404), "transaction not found in pool"),
        );
        let router = router(&transport, false, false);
        let classifier = ErrorClassifier::message_contains("transaction not found");

        let result = router
            .get(
                &OperationContext::new(),
                OperationKind::TransactionProcessStatus,
                "transaction/ab/process-status",
                Some(&classifier),
            )
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn unclassified_failure_propagates() {
        let transport = Arc::new(FakeTransport::new());
        transport.fail(
            "transaction/ab/process-status",
            UpstreamFailure::new(Some(500), "internal error"),
        );
        let router = router(&transport, false, false);
        let classifier = ErrorClassifier::message_contains("transaction not found");

        let err = router
            .get(
                &OperationContext::new(),
                OperationKind::TransactionProcessStatus,
                "transaction/ab/process-status",
                Some(&classifier),
            )
            .await
            .unwrap_err();

        match err {
            ProxyError::Upstream(failure) => {
                assert_eq!(failure.status, Some(500));
                assert_eq!(failure.message, "internal error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn post_forwards_body() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond("transaction/send", json!({"data": {"txHash": "ff"}}));
        let router = router(&transport, false, false);

        let payload = router
            .post(
                &OperationContext::new(),
                OperationKind::TransactionSend,
                "transaction/send",
                &json!({"nonce": 1}),
                None,
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(payload["txHash"], "ff");
        assert_eq!(transport.requested_bodies(), vec![json!({"nonce": 1})]);
    }

    #[tokio::test]
    async fn null_payload_is_absent() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond("about", json!({"data": null, "code": "successful"}));
        let router = router(&transport, false, false);

        let payload = router
            .get(&OperationContext::new(), OperationKind::About, "about", None)
            .await
            .unwrap();
        assert!(payload.is_none());
    }
}
