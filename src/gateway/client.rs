// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed gateway calls built on [`RequestRouter`].
//!
//! Each method is a fixed path plus an [`OperationKind`]; the router decides
//! where the call goes. Lookups that the gateway answers with a "not found"
//! error return `Ok(None)`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::context::OperationContext;
use super::kind::OperationKind;
use super::router::{ErrorClassifier, RequestRouter};
use super::transport::UpstreamFailure;
use crate::address::parse_token_identifier;
use crate::error::ProxyError;

const ACCOUNT_NOT_FOUND: &str = "account was not found";
const TRANSACTION_NOT_FOUND: &str = "transaction not found";
const TRANSACTION_POOL_FIELDS: &str = "nonce,sender,receiver,gaslimit,gasprice,receiverusername,data,value";

/// Balance and nonce of an account, as reported by `address/{address}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub address: String,
    /// Base units, decimal string.
    pub balance: String,
    pub nonce: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Processing status of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionProcessStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Answer of `transaction/send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSendResult {
    pub tx_hash: String,
}

/// Read access to authoritative chain state.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Next nonce the chain expects from `account`.
    async fn get_account_nonce(&self, account: &str) -> Result<u64, ProxyError>;
}

/// Gateway client shared by every handler.
#[derive(Clone)]
pub struct GatewayClient {
    router: Arc<RequestRouter>,
}

impl GatewayClient {
    pub fn new(router: Arc<RequestRouter>) -> Self {
        Self { router }
    }

    /// Gateway application version, if it reports one.
    pub async fn get_version(&self, context: &OperationContext) -> Result<Option<String>, ProxyError> {
        let payload = self
            .router
            .get(context, OperationKind::About, "about", None)
            .await?;

        Ok(payload
            .as_ref()
            .and_then(|p| p.get("appVersion"))
            .and_then(Value::as_str)
            .filter(|version| !version.is_empty() && *version != "undefined")
            .map(str::to_string))
    }

    /// Raw `address/{address}` payload, including `blockInfo` on deep-history calls.
    pub async fn get_address_details(
        &self,
        context: &OperationContext,
        address: &str,
    ) -> Result<Option<Value>, ProxyError> {
        self.router
            .get(
                context,
                OperationKind::AddressDetails,
                &format!("address/{address}"),
                None,
            )
            .await
    }

    pub async fn get_account(
        &self,
        context: &OperationContext,
        address: &str,
    ) -> Result<Option<AccountSummary>, ProxyError> {
        let payload = self.get_address_details(context, address).await?;
        payload
            .and_then(|mut p| p.get_mut("account").map(Value::take))
            .map(decode)
            .transpose()
    }

    /// Token balance of `address` for `identifier`. `None` when the account is unknown.
    pub async fn get_address_esdt(
        &self,
        context: &OperationContext,
        address: &str,
        identifier: &str,
    ) -> Result<Option<Value>, ProxyError> {
        let identifier = parse_token_identifier(identifier)?;
        let classifier = ErrorClassifier::message_contains(ACCOUNT_NOT_FOUND);
        let payload = self
            .router
            .get(
                context,
                OperationKind::AddressEsdtBalance,
                &format!("address/{address}/esdt/{identifier}"),
                Some(&classifier),
            )
            .await?;

        Ok(payload.and_then(|mut p| p.get_mut("tokenData").map(Value::take)))
    }

    pub async fn get_transaction_process_status(
        &self,
        context: &OperationContext,
        tx_hash: &str,
    ) -> Result<Option<TransactionProcessStatus>, ProxyError> {
        let classifier = ErrorClassifier::message_contains(TRANSACTION_NOT_FOUND);
        self.router
            .get(
                context,
                OperationKind::TransactionProcessStatus,
                &format!("transaction/{tx_hash}/process-status"),
                Some(&classifier),
            )
            .await?
            .map(decode)
            .transpose()
    }

    /// Full transaction with results. `None` when the gateway does not know it.
    pub async fn get_transaction(
        &self,
        context: &OperationContext,
        tx_hash: &str,
    ) -> Result<Option<Value>, ProxyError> {
        let classifier = ErrorClassifier::message_equals(TRANSACTION_NOT_FOUND);
        let payload = self
            .router
            .get(
                context,
                OperationKind::TransactionDetails,
                &format!("transaction/{tx_hash}?withResults=true"),
                Some(&classifier),
            )
            .await?;

        Ok(payload.and_then(|mut p| p.get_mut("transaction").map(Value::take)))
    }

    pub async fn get_network_status(
        &self,
        context: &OperationContext,
        shard: &str,
    ) -> Result<Option<Value>, ProxyError> {
        let payload = self
            .router
            .get(
                context,
                OperationKind::NetworkStatus,
                &format!("network/status/{shard}"),
                None,
            )
            .await?;

        Ok(payload.and_then(|mut p| p.get_mut("status").map(Value::take)))
    }

    pub async fn get_transaction_pool(
        &self,
        context: &OperationContext,
    ) -> Result<Option<Value>, ProxyError> {
        self.router
            .get(
                context,
                OperationKind::TransactionPool,
                &format!("transaction/pool?fields={TRANSACTION_POOL_FIELDS}"),
                None,
            )
            .await
    }

    /// Broadcast a signed transaction.
    pub async fn send_transaction(
        &self,
        context: &OperationContext,
        transaction: &Value,
    ) -> Result<TransactionSendResult, ProxyError> {
        let payload = self
            .router
            .post(
                context,
                OperationKind::TransactionSend,
                "transaction/send",
                transaction,
                None,
            )
            .await?
            .ok_or_else(|| {
                ProxyError::Upstream(UpstreamFailure::new(
                    None,
                    "Gateway returned no transaction hash",
                ))
            })?;

        decode(payload)
    }
}

#[async_trait]
impl ChainQuery for GatewayClient {
    async fn get_account_nonce(&self, account: &str) -> Result<u64, ProxyError> {
        // Always current state, whatever the calling operation is pinned to.
        let context = OperationContext::new();
        self.get_account(&context, account)
            .await?
            .map(|summary| summary.nonce)
            .ok_or_else(|| {
                ProxyError::Upstream(UpstreamFailure::new(
                    None,
                    format!("Gateway returned no account for {account}"),
                ))
            })
    }
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, ProxyError> {
    serde_json::from_value(payload).map_err(|e| {
        ProxyError::Upstream(UpstreamFailure::new(
            None,
            format!("Unexpected gateway payload: {e}"),
        ))
    })
}
