// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Native address <-> EVM alias resolution with a shared TTL cache.
//!
//! Resolution never fails from the caller's point of view: a gateway or
//! store failure yields `None`, is not cached, and the next call retries.
//! A successful "no alias" answer is cached like any other.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use super::context::OperationContext;
use super::kind::OperationKind;
use super::router::RequestRouter;
use crate::address::{is_address_valid, normalize_evm_address, strip_hex_prefix, with_hex_prefix};
use crate::cache::{get_or_compute, CacheStore};
use crate::error::ProxyError;

/// Alias scheme identifier of EVM-format addresses.
const EVM_ALIAS_IDENTIFIER: &str = "0002";

const ALIAS_PATH: &str = "address/alias-address";
const CANONICAL_PATH: &str = "address/mvx-address";

fn alias_key(address: &str) -> String {
    format!("aliasAddress:{address}")
}

fn canonical_key(alias_hex: &str) -> String {
    format!("canonicalAddress:{alias_hex}")
}

pub struct AliasResolver {
    router: Arc<RequestRouter>,
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl AliasResolver {
    pub fn new(router: Arc<RequestRouter>, store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { router, store, ttl }
    }

    /// EVM alias of a native address, always `0x`-prefixed.
    pub async fn resolve_alias_for(
        &self,
        context: &OperationContext,
        address: &str,
    ) -> Option<String> {
        let result: Result<Option<String>, ProxyError> =
            get_or_compute(self.store.as_ref(), &alias_key(address), self.ttl, || {
                self.fetch_alias(context, address)
            })
            .await;

        result.unwrap_or_else(|e| {
            tracing::debug!(address, error = %e, "Alias resolution failed");
            None
        })
    }

    /// Native address behind an EVM alias, in any case, with or without `0x`.
    pub async fn resolve_canonical_for(
        &self,
        context: &OperationContext,
        alias: &str,
    ) -> Option<String> {
        let alias_hex = strip_hex_prefix(alias).to_ascii_lowercase();
        let result: Result<Option<String>, ProxyError> =
            get_or_compute(self.store.as_ref(), &canonical_key(&alias_hex), self.ttl, || {
                self.fetch_canonical(context, &alias_hex)
            })
            .await;

        result.unwrap_or_else(|e| {
            tracing::debug!(alias, error = %e, "Canonical address resolution failed");
            None
        })
    }

    /// `(native, alias)` for either representation of an account.
    ///
    /// The side that was supplied is echoed back; the other side is `None`
    /// when it cannot be resolved.
    pub async fn resolve_both_for(
        &self,
        context: &OperationContext,
        input: &str,
    ) -> (Option<String>, Option<String>) {
        if is_address_valid(input) {
            let alias = self.resolve_alias_for(context, input).await;
            return (Some(input.to_string()), alias);
        }

        let canonical = self.resolve_canonical_for(context, input).await;
        let alias = normalize_evm_address(input).unwrap_or_else(|| input.to_string());
        (canonical, Some(alias))
    }

    async fn fetch_alias(
        &self,
        context: &OperationContext,
        address: &str,
    ) -> Result<Option<String>, ProxyError> {
        let body = json!([{
            "mvxAddress": address,
            "requestedIdentifier": EVM_ALIAS_IDENTIFIER,
        }]);
        let payload = self
            .router
            .post(context, OperationKind::AliasAddress, ALIAS_PATH, &body, None)
            .await?;

        Ok(lookup(payload, address).map(|alias| with_hex_prefix(&alias)))
    }

    async fn fetch_canonical(
        &self,
        context: &OperationContext,
        alias_hex: &str,
    ) -> Result<Option<String>, ProxyError> {
        let body = json!([{
            "aliasAddress": alias_hex,
            "aliasIdentifier": EVM_ALIAS_IDENTIFIER,
        }]);
        let payload = self
            .router
            .post(context, OperationKind::CanonicalAddress, CANONICAL_PATH, &body, None)
            .await?;

        Ok(lookup(payload, alias_hex))
    }
}

fn lookup(payload: Option<Value>, key: &str) -> Option<String> {
    payload?
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
