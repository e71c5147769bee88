// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Faucet: dispenses test tokens from a shared funding account.
//!
//! State shared across instances (nonce counter, claim records) lives in
//! the cache stores; this module holds no cross-request state of its own.

pub mod limiter;
pub mod nonce;
pub mod service;
pub mod signer;

pub use limiter::{Claim, ClaimRateLimiter};
pub use nonce::NonceAllocator;
pub use service::{FaucetReceipt, FaucetService};
pub use signer::{Ed25519Signer, SignerError, Transaction, TransactionSigner};
