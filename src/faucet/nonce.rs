// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared nonce counter for the faucet account.
//!
//! The counter lives in a [`CounterStore`] so that every service instance
//! draws from the same sequence. It is bootstrapped from the chain's next
//! expected nonce, which is issued as-is; every later allocation is an
//! atomic increment.
//!
//! ## Operational constraints
//!
//! - The counter expires after its TTL and is re-seeded from the chain. A
//!   transaction still pending at that moment is not yet reflected in the
//!   chain nonce, so the next allocation can repeat its nonce.
//! - An allocated nonce is consumed even if the transaction is never sent.
//!   The gap stalls later transactions until the counter expires and is
//!   re-seeded.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::CounterStore;
use crate::error::ProxyError;
use crate::gateway::ChainQuery;

/// Attempts before giving up on a counter that keeps expiring mid-allocation.
const MAX_ATTEMPTS: usize = 5;

fn nonce_key(account: &str) -> String {
    format!("faucetWalletNonce:{account}")
}

pub struct NonceAllocator {
    counters: Arc<dyn CounterStore>,
    chain: Arc<dyn ChainQuery>,
    ttl: Duration,
}

impl NonceAllocator {
    pub fn new(counters: Arc<dyn CounterStore>, chain: Arc<dyn ChainQuery>, ttl: Duration) -> Self {
        Self {
            counters,
            chain,
            ttl,
        }
    }

    /// Issue the next nonce for `account`.
    ///
    /// Concurrent callers, on this instance or any other sharing the store,
    /// always receive distinct, strictly increasing values. A chain query
    /// failure during bootstrap fails the allocation.
    pub async fn allocate_next(&self, account: &str) -> Result<u64, ProxyError> {
        let key = nonce_key(account);

        for _ in 0..MAX_ATTEMPTS {
            if let Some(nonce) = self.counters.increment_by(&key, 1).await? {
                return Ok(nonce);
            }

            let chain_nonce = self
                .chain
                .get_account_nonce(account)
                .await
                .map_err(|e| ProxyError::Allocation(e.to_string()))?;

            // Only one racer seeds the counter; the others fall through to the
            // increment on their next attempt.
            if self
                .counters
                .set_counter_if_absent(&key, chain_nonce, self.ttl)
                .await?
            {
                tracing::info!(account, nonce = chain_nonce, "Seeded faucet nonce from chain");
                return Ok(chain_nonce);
            }
        }

        Err(ProxyError::Allocation(format!(
            "nonce counter for {account} expired repeatedly during allocation"
        )))
    }
}
