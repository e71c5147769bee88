// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-operation routing context.
//!
//! One [`OperationContext`] is created for each inbound operation (one HTTP
//! request) and handed to every router call that operation makes. Clones are
//! handles to the same state, so a `blockInfo` written by one gateway call is
//! visible to the next call of the same operation.
//!
//! Code that cannot take the context as a parameter reads it through
//! [`OperationContext::current`], which is backed by a tokio task-local set
//! with [`OperationContext::scope`]. The task-local is bound to the scoped
//! future only, so a context never leaks into unrelated work on the same
//! worker thread.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

tokio::task_local! {
    static CURRENT: OperationContext;
}

#[derive(Debug, Default)]
struct ContextState {
    deep_history_block_nonce: Option<u64>,
    deep_history_block_info: Option<Value>,
}

/// Mutable state owned by exactly one logical operation.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    state: Arc<Mutex<ContextState>>,
}

impl OperationContext {
    /// Context for a current-state operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for an operation pinned to a historical block.
    pub fn at_block(block_nonce: u64) -> Self {
        let context = Self::new();
        context.set_deep_history_block_nonce(Some(block_nonce));
        context
    }

    fn lock(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn deep_history_block_nonce(&self) -> Option<u64> {
        self.lock().deep_history_block_nonce
    }

    pub fn set_deep_history_block_nonce(&self, block_nonce: Option<u64>) {
        self.lock().deep_history_block_nonce = block_nonce;
    }

    pub fn deep_history_block_info(&self) -> Option<Value> {
        self.lock().deep_history_block_info.clone()
    }

    /// Overwrite the block info. Last write wins.
    pub fn set_deep_history_block_info(&self, block_info: Value) {
        self.lock().deep_history_block_info = Some(block_info);
    }

    /// Run `future` with this context installed as the task's current context.
    pub async fn scope<F>(self, future: F) -> F::Output
    where
        F: Future,
    {
        CURRENT.scope(self, future).await
    }

    /// The context installed by the enclosing [`OperationContext::scope`], if any.
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|context| context.clone()).ok()
    }

    /// The enclosing context, or a fresh current-state one.
    pub fn current_or_new() -> Self {
        Self::current().unwrap_or_default()
    }
}
