// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Faucet dispensing flow.
//!
//! 1. Validate the claimant (native or EVM-format address)
//! 2. Resolve an EVM claimant to its native account
//! 3. Refuse accounts that already hold more than one token
//! 4. Reserve the claim (per-address cooldown)
//! 5. Allocate a nonce, sign and broadcast the transfer
//!
//! The cooldown is keyed on the native account when it is known, so an
//! account and its EVM alias share one window. The claim reservation is
//! released when anything after step 4 fails, so a failed transfer does not
//! lock the claimant out. An allocated nonce is
//! not returned (see [`super::nonce`]).

use std::sync::Arc;

use serde::Serialize;

use super::limiter::ClaimRateLimiter;
use super::nonce::NonceAllocator;
use super::signer::{Ed25519Signer, SignerError, Transaction, TransactionSigner};
use crate::address::{strip_hex_prefix, AddressInput};
use crate::cache::{CacheStore, CounterStore};
use crate::config::FaucetConfig;
use crate::error::ProxyError;
use crate::gateway::{AliasResolver, GatewayClient, OperationContext, UpstreamFailure};

/// One token in base units.
const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;
/// Amount sent per claim.
const DISPENSE_AMOUNT: u128 = 5 * ONE_TOKEN;
const GAS_PRICE: u64 = 1_000_000_000;
const GAS_LIMIT: u64 = 500_000;
const EVM_ALIAS_IDENTIFIER: &str = "0002";

/// Result of a successful claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetReceipt {
    pub tx_hash: String,
    pub sender: String,
    pub receiver: String,
    pub nonce: u64,
    pub status: String,
}

pub struct FaucetService {
    config: FaucetConfig,
    signer: Option<Arc<dyn TransactionSigner>>,
    gateway: Arc<GatewayClient>,
    aliases: Arc<AliasResolver>,
    nonces: NonceAllocator,
    limiter: ClaimRateLimiter,
}

impl FaucetService {
    /// Build the faucet. Without a configured key every claim fails with
    /// [`ProxyError::FaucetDisabled`].
    pub fn new(
        config: FaucetConfig,
        gateway: Arc<GatewayClient>,
        aliases: Arc<AliasResolver>,
        claims: Arc<dyn CacheStore>,
        counters: Arc<dyn CounterStore>,
    ) -> Result<Self, SignerError> {
        let signer = config
            .private_key_hex
            .as_deref()
            .map(Ed25519Signer::from_hex)
            .transpose()?
            .map(|signer| Arc::new(signer) as Arc<dyn TransactionSigner>);

        let nonces = NonceAllocator::new(counters, gateway.clone(), config.nonce_ttl);

        Ok(Self {
            config,
            signer,
            gateway,
            aliases,
            nonces,
            limiter: ClaimRateLimiter::new(claims),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.signer.is_some()
    }

    /// Faucet account address, when enabled.
    pub fn address(&self) -> Option<&str> {
        self.signer.as_ref().map(|signer| signer.address())
    }

    pub async fn send_tokens_to_address(
        &self,
        address: Option<&str>,
    ) -> Result<FaucetReceipt, ProxyError> {
        let claimant = address
            .map(AddressInput::parse)
            .transpose()
            .ok()
            .flatten()
            .ok_or_else(|| ProxyError::Validation("Provided address is not valid".to_string()))?;

        let signer = self.signer.as_ref().ok_or(ProxyError::FaucetDisabled)?;

        // Faucet calls always read current state
        let context = OperationContext::new();

        let (native, receiver, data) = match &claimant {
            AddressInput::Native(address) => (Some(address.clone()), address.clone(), None),
            AddressInput::Evm(alias) => {
                let contract = self.config.cross_address_contract.clone().ok_or_else(|| {
                    ProxyError::NotAcceptable("EVM-format claims are not supported".to_string())
                })?;
                let native = self.aliases.resolve_canonical_for(&context, alias).await;
                let data = format!(
                    "crossAddressTransfer@{}@{EVM_ALIAS_IDENTIFIER}",
                    strip_hex_prefix(alias)
                );
                (native, contract, Some(data))
            }
        };

        if let Some(native) = &native {
            self.ensure_below_balance_cap(&context, native).await?;
        }

        // An EVM claimant shares the cooldown of the account behind it
        let claim_key = native.as_deref().unwrap_or(claimant.as_str());
        let Some(claim) = self
            .limiter
            .try_claim(claim_key, self.config.claim_cooldown)
            .await?
        else {
            return Err(ProxyError::RateLimitExceeded(format!(
                "You can only claim once every {}. Please try again later.",
                describe_cooldown(self.config.claim_cooldown.as_secs())
            )));
        };

        tracing::warn!(address = claim_key, receiver = %receiver, "Sending faucet tokens");

        match self
            .transfer(&context, signer.as_ref(), &receiver, data.as_deref())
            .await
        {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                tracing::error!(address = claim_key, error = %e, "Faucet transfer failed");
                match self.limiter.release(&claim).await {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::debug!(address = claim_key, "Claim superseded, not released");
                    }
                    Err(release_err) => {
                        tracing::warn!(
                            address = claim_key,
                            error = %release_err,
                            "Failed to release claim"
                        );
                    }
                }
                Err(e)
            }
        }
    }

    async fn ensure_below_balance_cap(
        &self,
        context: &OperationContext,
        address: &str,
    ) -> Result<(), ProxyError> {
        let Some(account) = self.gateway.get_account(context, address).await? else {
            return Ok(());
        };

        let balance: u128 = account.balance.parse().map_err(|_| {
            ProxyError::Upstream(UpstreamFailure::new(
                None,
                format!("Unexpected balance '{}' for {address}", account.balance),
            ))
        })?;

        if balance > ONE_TOKEN {
            return Err(ProxyError::NotAcceptable(
                "Account balance exceeds 1 token".to_string(),
            ));
        }
        Ok(())
    }

    async fn transfer(
        &self,
        context: &OperationContext,
        signer: &dyn TransactionSigner,
        receiver: &str,
        data: Option<&str>,
    ) -> Result<FaucetReceipt, ProxyError> {
        let nonce = self.nonces.allocate_next(signer.address()).await?;

        let mut transaction = Transaction::new(
            nonce,
            DISPENSE_AMOUNT.to_string(),
            signer.address(),
            receiver,
            GAS_PRICE,
            GAS_LIMIT,
            self.config.chain_id.as_str(),
        );
        if let Some(data) = data {
            transaction = transaction.with_data(data);
        }
        transaction.sign(signer)?;

        let sent = self
            .gateway
            .send_transaction(context, &transaction.to_sendable()?)
            .await?;

        Ok(FaucetReceipt {
            tx_hash: sent.tx_hash,
            sender: transaction.sender,
            receiver: transaction.receiver,
            nonce,
            status: "pending".to_string(),
        })
    }
}

fn describe_cooldown(secs: u64) -> String {
    match secs {
        60 => "minute".to_string(),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "second".to_string(),
        s => format!("{s} seconds"),
    }
}
