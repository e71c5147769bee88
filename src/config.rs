// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3001` |
//! | `GATEWAY_URL` | Default gateway endpoint | Required |
//! | `SNAPSHOTLESS_GATEWAY_URL` | Snapshotless gateway endpoint | Falls back to `GATEWAY_URL` |
//! | `DEEP_HISTORY_GATEWAY_URL` | Deep-history gateway endpoint | Optional |
//! | `GATEWAY_TIMEOUT_SECS` | Timeout for every gateway call | `30` |
//! | `CACHE_CAPACITY` | Max entries held by the in-memory store | `100000` |
//! | `ALIAS_CACHE_TTL_SECS` | Alias resolution cache TTL | `86400` |
//! | `FAUCET_PRIVATE_KEY` | Hex ed25519 seed of the faucet account | Optional (faucet disabled) |
//! | `FAUCET_CHAIN_ID` | Chain ID stamped on faucet transactions | `1` |
//! | `FAUCET_CROSS_ADDRESS_CONTRACT` | Receiver for EVM-format claimants | Optional |
//! | `FAUCET_CLAIM_COOLDOWN_SECS` | Minimum interval between claims per address | `300` |
//! | `FAUCET_NONCE_TTL_SECS` | TTL of the shared faucet nonce counter | `300` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::time::Duration;

use url::Url;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const GATEWAY_URL_ENV: &str = "GATEWAY_URL";
pub const SNAPSHOTLESS_GATEWAY_URL_ENV: &str = "SNAPSHOTLESS_GATEWAY_URL";
pub const DEEP_HISTORY_GATEWAY_URL_ENV: &str = "DEEP_HISTORY_GATEWAY_URL";
pub const GATEWAY_TIMEOUT_SECS_ENV: &str = "GATEWAY_TIMEOUT_SECS";
pub const CACHE_CAPACITY_ENV: &str = "CACHE_CAPACITY";
pub const ALIAS_CACHE_TTL_SECS_ENV: &str = "ALIAS_CACHE_TTL_SECS";
pub const FAUCET_PRIVATE_KEY_ENV: &str = "FAUCET_PRIVATE_KEY";
pub const FAUCET_CHAIN_ID_ENV: &str = "FAUCET_CHAIN_ID";
pub const FAUCET_CROSS_ADDRESS_CONTRACT_ENV: &str = "FAUCET_CROSS_ADDRESS_CONTRACT";
pub const FAUCET_CLAIM_COOLDOWN_SECS_ENV: &str = "FAUCET_CLAIM_COOLDOWN_SECS";
pub const FAUCET_NONCE_TTL_SECS_ENV: &str = "FAUCET_NONCE_TTL_SECS";

/// Environment variable selecting the log formatter.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_CAPACITY: usize = 100_000;
const DEFAULT_ALIAS_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_CHAIN_ID: &str = "1";
const DEFAULT_CLAIM_COOLDOWN_SECS: u64 = 5 * 60;
const DEFAULT_NONCE_TTL_SECS: u64 = 5 * 60;

/// The three gateway endpoint variants the router chooses between.
#[derive(Debug, Clone)]
pub struct GatewayEndpoints {
    /// Endpoint for everything without a more specific route.
    pub default: Url,
    /// Endpoint optimized for current-state reads.
    pub snapshotless: Option<Url>,
    /// Endpoint answering queries against a historical block.
    pub deep_history: Option<Url>,
}

/// Faucet settings. The faucet is disabled when no private key is configured.
#[derive(Clone)]
pub struct FaucetConfig {
    pub private_key_hex: Option<String>,
    pub chain_id: String,
    pub cross_address_contract: Option<String>,
    pub claim_cooldown: Duration,
    pub nonce_ttl: Duration,
}

// Never print the signing key
impl fmt::Debug for FaucetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaucetConfig")
            .field(
                "private_key_hex",
                &self.private_key_hex.as_ref().map(|_| "<redacted>"),
            )
            .field("chain_id", &self.chain_id)
            .field("cross_address_contract", &self.cross_address_contract)
            .field("claim_cooldown", &self.claim_cooldown)
            .field("nonce_ttl", &self.nonce_ttl)
            .finish()
    }
}

/// Fully parsed service configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub endpoints: GatewayEndpoints,
    pub gateway_timeout: Duration,
    pub cache_capacity: usize,
    pub alias_cache_ttl: Duration,
    pub faucet: FaucetConfig,
}

impl ProxyConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let default = get(GATEWAY_URL_ENV)
            .ok_or(ConfigError::Missing(GATEWAY_URL_ENV))
            .and_then(|raw| parse_url(GATEWAY_URL_ENV, &raw))?;
        let snapshotless = get(SNAPSHOTLESS_GATEWAY_URL_ENV)
            .map(|raw| parse_url(SNAPSHOTLESS_GATEWAY_URL_ENV, &raw))
            .transpose()?;
        let deep_history = get(DEEP_HISTORY_GATEWAY_URL_ENV)
            .map(|raw| parse_url(DEEP_HISTORY_GATEWAY_URL_ENV, &raw))
            .transpose()?;

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(PORT_ENV, get(PORT_ENV), DEFAULT_PORT)?,
            endpoints: GatewayEndpoints {
                default,
                snapshotless,
                deep_history,
            },
            gateway_timeout: Duration::from_secs(parse_or(
                GATEWAY_TIMEOUT_SECS_ENV,
                get(GATEWAY_TIMEOUT_SECS_ENV),
                DEFAULT_GATEWAY_TIMEOUT_SECS,
            )?),
            cache_capacity: parse_or(
                CACHE_CAPACITY_ENV,
                get(CACHE_CAPACITY_ENV),
                DEFAULT_CACHE_CAPACITY,
            )?,
            alias_cache_ttl: Duration::from_secs(parse_or(
                ALIAS_CACHE_TTL_SECS_ENV,
                get(ALIAS_CACHE_TTL_SECS_ENV),
                DEFAULT_ALIAS_CACHE_TTL_SECS,
            )?),
            faucet: FaucetConfig {
                private_key_hex: get(FAUCET_PRIVATE_KEY_ENV),
                chain_id: get(FAUCET_CHAIN_ID_ENV).unwrap_or_else(|| DEFAULT_CHAIN_ID.to_string()),
                cross_address_contract: get(FAUCET_CROSS_ADDRESS_CONTRACT_ENV),
                claim_cooldown: Duration::from_secs(parse_or(
                    FAUCET_CLAIM_COOLDOWN_SECS_ENV,
                    get(FAUCET_CLAIM_COOLDOWN_SECS_ENV),
                    DEFAULT_CLAIM_COOLDOWN_SECS,
                )?),
                nonce_ttl: Duration::from_secs(parse_or(
                    FAUCET_NONCE_TTL_SECS_ENV,
                    get(FAUCET_NONCE_TTL_SECS_ENV),
                    DEFAULT_NONCE_TTL_SECS,
                )?),
            },
        })
    }
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
