// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Shared Stores
//!
//! Alias entries, claim records and the faucet nonce counter are shared by
//! every operation and every service instance. Their correctness rests on
//! the single-key atomic primitives of the backing store, never on locks
//! held inside this process.
//!
//! - [`CacheStore`] - TTL-bounded JSON values with set-if-absent and
//!   compare-and-swap
//! - [`CounterStore`] - TTL-bounded integer counters with atomic increment
//! - [`get_or_compute`] - cache-or-fetch wrapper around a compute closure
//! - [`InMemoryStore`] - LRU-bounded implementation of both traits

pub mod memory;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

pub use memory::InMemoryStore;

/// Key-value store with per-entry TTL. Every method is linearizable per key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError>;

    /// Write `value` only when no live entry exists. Returns whether it was written.
    async fn set_if_absent(&self, key: &str, value: Value, ttl: Duration)
        -> Result<bool, StoreError>;

    /// Replace the live entry only when it still equals `expected`.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &Value,
        value: Value,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    /// Delete the live entry only when it still equals `expected`.
    async fn remove_if_equals(&self, key: &str, expected: &Value) -> Result<bool, StoreError>;
}

/// Integer counter store. Every method is linearizable per key.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn get_counter(&self, key: &str) -> Result<Option<u64>, StoreError>;

    async fn set_counter(&self, key: &str, value: u64, ttl: Duration) -> Result<(), StoreError>;

    /// Seed the counter only when it does not exist. Returns whether it was seeded.
    async fn set_counter_if_absent(
        &self,
        key: &str,
        value: u64,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    /// Atomically add `delta` and return the new value.
    ///
    /// Returns `None` when the counter does not exist (never seeded or
    /// expired); a missing counter is never implicitly created. The entry
    /// keeps its original expiry.
    async fn increment_by(&self, key: &str, delta: u64) -> Result<Option<u64>, StoreError>;
}

/// Return the cached value for `key`, or run `compute` and cache its result.
///
/// Only a successful computation is cached; an error is handed back to the
/// caller and the next call computes again. `Ok(None)` is a legitimate,
/// cacheable answer.
pub async fn get_or_compute<T, E, F, Fut>(
    store: &dyn CacheStore,
    key: &str,
    ttl: Duration,
    compute: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    E: From<StoreError>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(cached) = store.get(key).await? {
        match serde_json::from_value(cached) {
            Ok(value) => return Ok(value),
            Err(e) => tracing::warn!(key, error = %e, "Discarding undecodable cache entry"),
        }
    }

    let value = compute().await?;
    let stored = match serde_json::to_value(&value) {
        Ok(encoded) => store.set(key, encoded, ttl).await,
        Err(e) => Err(StoreError::Codec(e.to_string())),
    };
    // The computed value is still good when caching it fails
    if let Err(e) = stored {
        tracing::warn!(key, error = %e, "Failed to cache computed value");
    }
    Ok(value)
}

/// Errors raised by a backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("value under {0} is not a counter")]
    NotACounter(String),

    #[error("failed to encode cache value: {0}")]
    Codec(String),

    #[error("counter under {0} would overflow")]
    Overflow(String),
}
