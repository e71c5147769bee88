// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::cache::InMemoryStore;
use crate::config::ProxyConfig;
use crate::faucet::{FaucetService, SignerError};
use crate::gateway::{AliasResolver, GatewayClient, HttpTransport, RequestRouter};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayClient>,
    pub aliases: Arc<AliasResolver>,
    pub faucet: Arc<FaucetService>,
}

impl AppState {
    /// Wire every service on top of `transport` and one shared store.
    pub fn new(config: &ProxyConfig, transport: Arc<dyn HttpTransport>) -> Result<Self, SignerError> {
        let store = Arc::new(InMemoryStore::new(config.cache_capacity));
        let router = Arc::new(RequestRouter::new(config.endpoints.clone(), transport));
        let gateway = Arc::new(GatewayClient::new(router.clone()));
        let aliases = Arc::new(AliasResolver::new(
            router,
            store.clone(),
            config.alias_cache_ttl,
        ));
        let faucet = Arc::new(FaucetService::new(
            config.faucet.clone(),
            gateway.clone(),
            aliases.clone(),
            store.clone(),
            store,
        )?);

        Ok(Self {
            gateway,
            aliases,
            faucet,
        })
    }
}
