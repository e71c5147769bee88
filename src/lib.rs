// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Gateway Proxy - Single API over Chain Gateway Endpoints
//!
//! Fronts the default, snapshotless and deep-history gateway endpoints and
//! routes every call to the right one, carrying a per-request context that
//! can pin reads to a historical block.
//!
//! ## Modules
//!
//! - `gateway` - Routing policy, operation context, typed calls, alias resolution
//! - `cache` - Shared TTL stores (values and counters)
//! - `faucet` - Nonce allocation, claim cooldown, signed transfers
//! - `api` - HTTP API handlers (Axum)

pub mod address;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod faucet;
pub mod gateway;
pub mod state;
