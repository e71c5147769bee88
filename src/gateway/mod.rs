// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway access layer.
//!
//! This module provides:
//! - Static routing policy per operation kind
//! - Per-operation context propagation (deep-history block pinning)
//! - Endpoint selection and request execution
//! - Typed gateway calls and alias resolution

pub mod alias;
pub mod client;
pub mod context;
pub mod kind;
pub mod router;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use alias::AliasResolver;
pub use client::{AccountSummary, ChainQuery, GatewayClient, TransactionProcessStatus, TransactionSendResult};
pub use context::OperationContext;
pub use kind::{EndpointPolicy, OperationKind};
pub use router::{ErrorClassifier, RequestRouter};
pub use transport::{HttpTransport, ReqwestTransport, UpstreamFailure};
