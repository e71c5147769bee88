// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU-bounded in-process store with per-entry TTL.
//!
//! Serves single-instance deployments and tests. Every operation runs under
//! one mutex, which gives the per-key linearizability the shared-store
//! traits require. Multi-instance deployments need a store shared between
//! instances behind the same traits.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use serde_json::Value;

use super::{CacheStore, CounterStore, StoreError};

/// Cached entry: value + expiry deadline.
struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// In-process implementation of [`CacheStore`] and [`CounterStore`].
pub struct InMemoryStore {
    entries: Mutex<LruCache<String, Entry>>,
}

impl InMemoryStore {
    /// Create a new store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Look up a live entry, evicting it if it has expired.
fn live<'a>(entries: &'a mut LruCache<String, Entry>, key: &str) -> Option<&'a mut Entry> {
    let expired = match entries.peek(key) {
        Some(entry) => !entry.is_live(),
        None => return None,
    };
    if expired {
        entries.pop(key);
        return None;
    }
    entries.get_mut(key)
}

#[async_trait]
impl CacheStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut entries = self.lock();
        Ok(live(&mut entries, key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        self.lock().put(key.to_string(), Entry::new(value, ttl));
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: Value,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut entries = self.lock();
        if live(&mut entries, key).is_some() {
            return Ok(false);
        }
        entries.put(key.to_string(), Entry::new(value, ttl));
        Ok(true)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &Value,
        value: Value,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut entries = self.lock();
        match live(&mut entries, key) {
            Some(entry) if entry.value == *expected => {
                *entry = Entry::new(value, ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_if_equals(&self, key: &str, expected: &Value) -> Result<bool, StoreError> {
        let mut entries = self.lock();
        let matches = live(&mut entries, key).is_some_and(|entry| entry.value == *expected);
        if matches {
            entries.pop(key);
        }
        Ok(matches)
    }
}

#[async_trait]
impl CounterStore for InMemoryStore {
    async fn get_counter(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let mut entries = self.lock();
        match live(&mut entries, key) {
            None => Ok(None),
            Some(entry) => entry
                .value
                .as_u64()
                .map(Some)
                .ok_or_else(|| StoreError::NotACounter(key.to_string())),
        }
    }

    async fn set_counter(&self, key: &str, value: u64, ttl: Duration) -> Result<(), StoreError> {
        self.lock()
            .put(key.to_string(), Entry::new(Value::from(value), ttl));
        Ok(())
    }

    async fn set_counter_if_absent(
        &self,
        key: &str,
        value: u64,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        CacheStore::set_if_absent(self, key, Value::from(value), ttl).await
    }

    async fn increment_by(&self, key: &str, delta: u64) -> Result<Option<u64>, StoreError> {
        let mut entries = self.lock();
        let Some(entry) = live(&mut entries, key) else {
            return Ok(None);
        };
        let current = entry
            .value
            .as_u64()
            .ok_or_else(|| StoreError::NotACounter(key.to_string()))?;
        let next = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::Overflow(key.to_string()))?;
        entry.value = Value::from(next);
        Ok(Some(next))
    }
}
