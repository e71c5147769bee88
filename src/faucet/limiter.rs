// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-address claim cooldown.
//!
//! A claim record holds the millisecond timestamp of the last accepted claim
//! and expires with the window. Check and record happen through the store's
//! conditional writes, so two concurrent claims for one address cannot both
//! be accepted.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::cache::{CacheStore, StoreError};

const MAX_ATTEMPTS: usize = 5;

fn claim_key(address: &str) -> String {
    format!("faucetClaim:{address}")
}

/// An accepted claim, needed to release it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub address: String,
    pub claimed_at_ms: i64,
}

pub struct ClaimRateLimiter {
    store: Arc<dyn CacheStore>,
}

impl ClaimRateLimiter {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Accept a claim for `address` unless one was accepted within `window`.
    pub async fn try_claim(
        &self,
        address: &str,
        window: Duration,
    ) -> Result<Option<Claim>, StoreError> {
        self.try_claim_at(address, window, Utc::now()).await
    }

    /// [`ClaimRateLimiter::try_claim`] with an explicit clock reading.
    pub async fn try_claim_at(
        &self,
        address: &str,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<Claim>, StoreError> {
        let key = claim_key(address);
        let now_ms = now.timestamp_millis();
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        let accepted = || {
            Some(Claim {
                address: address.to_string(),
                claimed_at_ms: now_ms,
            })
        };

        for _ in 0..MAX_ATTEMPTS {
            if self
                .store
                .set_if_absent(&key, Value::from(now_ms), window)
                .await?
            {
                return Ok(accepted());
            }

            // Record vanished between the two calls
            let Some(record) = self.store.get(&key).await? else {
                continue;
            };

            // An unreadable record counts as stale
            if let Some(last_claim_ms) = record.as_i64() {
                if now_ms.saturating_sub(last_claim_ms) < window_ms {
                    return Ok(None);
                }
            }

            if self
                .store
                .compare_and_swap(&key, &record, Value::from(now_ms), window)
                .await?
            {
                return Ok(accepted());
            }
        }

        Ok(None)
    }

    /// Drop the record written by `claim`, e.g. after the claimed transfer
    /// failed. A newer claim's record is left in place. Returns whether the
    /// record was dropped.
    pub async fn release(&self, claim: &Claim) -> Result<bool, StoreError> {
        self.store
            .remove_if_equals(&claim_key(&claim.address), &Value::from(claim.claimed_at_ms))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryStore;
    use chrono::TimeDelta;

    const WINDOW: Duration = Duration::from_secs(5 * 60);

    fn limiter() -> ClaimRateLimiter {
        ClaimRateLimiter::new(Arc::new(InMemoryStore::new(64)))
    }

    #[tokio::test]
    async fn second_claim_inside_window_is_rejected() {
        let limiter = limiter();
        let t0 = Utc::now();

        assert!(limiter.try_claim_at("one1a", WINDOW, t0).await.unwrap().is_some());
        assert!(limiter
            .try_claim_at("one1a", WINDOW, t0 + TimeDelta::minutes(1))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn claim_after_window_is_accepted() {
        let limiter = limiter();
        let t0 = Utc::now();

        assert!(limiter.try_claim_at("one1a", WINDOW, t0).await.unwrap().is_some());
        assert!(limiter
            .try_claim_at("one1a", WINDOW, t0 + TimeDelta::minutes(6))
            .await
            .unwrap()
            .is_some());
        // The renewed record starts a new window
        assert!(limiter
            .try_claim_at("one1a", WINDOW, t0 + TimeDelta::minutes(7))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn addresses_are_independent() {
        let limiter = limiter();
        assert!(limiter.try_claim("one1a", WINDOW).await.unwrap().is_some());
        assert!(limiter.try_claim("one1b", WINDOW).await.unwrap().is_some());
        assert!(limiter.try_claim("one1a", WINDOW).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn release_allows_immediate_retry() {
        let limiter = limiter();
        let claim = limiter.try_claim("one1a", WINDOW).await.unwrap().unwrap();
        assert!(limiter.release(&claim).await.unwrap());
        assert!(limiter.try_claim("one1a", WINDOW).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn release_keeps_newer_claim() {
        let limiter = limiter();
        let t0 = Utc::now();

        let stale = limiter
            .try_claim_at("one1a", WINDOW, t0)
            .await
            .unwrap()
            .unwrap();
        // The window passed while the first transfer was still in flight
        assert!(limiter
            .try_claim_at("one1a", WINDOW, t0 + TimeDelta::minutes(6))
            .await
            .unwrap()
            .is_some());

        assert!(!limiter.release(&stale).await.unwrap());
        assert!(limiter
            .try_claim_at("one1a", WINDOW, t0 + TimeDelta::minutes(7))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn record_expires_with_window() {
        let limiter = limiter();
        let window = Duration::from_millis(1);
        assert!(limiter.try_claim("one1a", window).await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(limiter.try_claim("one1a", window).await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claims_accept_exactly_one() {
        let limiter = Arc::new(limiter());
        let now = Utc::now();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.try_claim_at("one1a", WINDOW, now).await })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_some() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
    }
}
