// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Address and hash handling.
//!
//! Accounts have two representations:
//! - **native**: bech32 encoding of the 32-byte public key, `one` HRP
//! - **EVM alias**: 20-byte hex address (`0x` + 40 hex chars), resolved
//!   through the gateway's alias endpoints
//!
//! Everything here is pure; malformed input is rejected before any gateway
//! call is made.

use alloy::primitives::Address as EvmAddress;
use bech32::{Bech32, Hrp};

/// Human-readable part of native addresses.
pub const NATIVE_HRP: &str = "one";

/// Length of a native public key in bytes.
const PUBLIC_KEY_LEN: usize = 32;

/// Length of a transaction hash in hex characters.
const TX_HASH_HEX_LEN: usize = 64;

/// Which representation a caller supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressInput {
    /// Native bech32 address, normalized to the `one` HRP.
    Native(String),
    /// EVM-format alias as `0x` + 40 lowercase hex characters.
    Evm(String),
}

impl AddressInput {
    /// Classify `value`. Native addresses are re-encoded under the `one`
    /// HRP and EVM addresses lowercased, so every spelling of one account
    /// yields the same value.
    pub fn parse(value: &str) -> Result<Self, AddressError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AddressError::Empty);
        }
        if let Some(evm) = normalize_evm_address(value) {
            return Ok(Self::Evm(evm));
        }
        to_native_hrp(value).map(Self::Native)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Native(address) | Self::Evm(address) => address,
        }
    }
}

/// Whether `address` decodes as a bech32 address carrying a 32-byte key.
///
/// Any HRP is accepted; use [`to_native_hrp`] to normalize.
pub fn is_address_valid(address: &str) -> bool {
    decode_public_key(address).is_ok()
}

/// Whether `address` is an EVM address: optional `0x`, 40 hex characters,
/// and a valid EIP-55 checksum when letters are mixed-case.
pub fn is_evm_address(address: &str) -> bool {
    let hex = strip_hex_prefix(address);
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return EvmAddress::parse_checksummed(format!("0x{hex}"), None).is_ok();
    }

    true
}

/// `0x` + lowercase hex form of an EVM address, or `None` when `address`
/// is not one.
pub fn normalize_evm_address(address: &str) -> Option<String> {
    is_evm_address(address)
        .then(|| format!("0x{}", strip_hex_prefix(address).to_ascii_lowercase()))
}

/// Re-encode any valid bech32 address under the native HRP.
pub fn to_native_hrp(address: &str) -> Result<String, AddressError> {
    let public_key = decode_public_key(address)?;
    encode_public_key(&public_key)
}

/// Encode a hex public key as a native bech32 address.
pub fn bech32_encode(public_key_hex: &str) -> Result<String, AddressError> {
    let bytes = alloy::hex::decode(strip_hex_prefix(public_key_hex))
        .map_err(|e| AddressError::InvalidHex(e.to_string()))?;
    if bytes.len() != PUBLIC_KEY_LEN {
        return Err(AddressError::InvalidLength(bytes.len()));
    }
    encode_public_key(&bytes)
}

/// Validate a token identifier: `TICKER-abcdef`, or `TICKER-abcdef-0a` for
/// a token with a nonce. The ticker is 3 to 10 alphanumeric characters, the
/// random part 6 lowercase hex characters, the nonce an even number of hex
/// characters.
pub fn parse_token_identifier(value: &str) -> Result<String, AddressError> {
    let invalid = || AddressError::InvalidTokenIdentifier(value.to_string());
    let is_lower_hex = |part: &str| part.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));

    let mut parts = value.split('-');
    let (Some(ticker), Some(random)) = (parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let nonce = parts.next();
    if parts.next().is_some() {
        return Err(invalid());
    }

    let ticker_ok = (3..=10).contains(&ticker.len())
        && ticker.bytes().all(|b| b.is_ascii_alphanumeric());
    if !ticker_ok {
        return Err(invalid());
    }
    if random.len() != 6 || !is_lower_hex(random) {
        return Err(invalid());
    }
    if let Some(nonce) = nonce {
        if nonce.is_empty() || nonce.len() % 2 != 0 || !is_lower_hex(nonce) {
            return Err(invalid());
        }
    }

    Ok(value.to_string())
}

/// Strip a leading `0x` from an EVM address or hash.
pub fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Prefix `value` with `0x` unless it already carries it.
pub fn with_hex_prefix(value: &str) -> String {
    if value.starts_with("0x") {
        value.to_string()
    } else {
        format!("0x{value}")
    }
}

/// Validate a transaction hash and return it without any `0x` prefix.
pub fn parse_transaction_hash(value: &str) -> Result<String, AddressError> {
    let hash = strip_hex_prefix(value.trim());
    if !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidHash(
            "Value does not represent a hash".to_string(),
        ));
    }
    if hash.len() != TX_HASH_HEX_LEN {
        return Err(AddressError::InvalidHash(format!(
            "Length should be {TX_HASH_HEX_LEN}."
        )));
    }
    Ok(hash.to_string())
}

fn decode_public_key(address: &str) -> Result<Vec<u8>, AddressError> {
    let (_, data) =
        bech32::decode(address).map_err(|e| AddressError::InvalidBech32(e.to_string()))?;
    if data.len() != PUBLIC_KEY_LEN {
        return Err(AddressError::InvalidLength(data.len()));
    }
    Ok(data)
}

fn encode_public_key(public_key: &[u8]) -> Result<String, AddressError> {
    let hrp = Hrp::parse(NATIVE_HRP).map_err(|e| AddressError::InvalidBech32(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, public_key).map_err(|e| AddressError::InvalidBech32(e.to_string()))
}

/// Address and hash validation failures.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("a valid address is expected")]
    Empty,

    #[error("invalid bech32 address: {0}")]
    InvalidBech32(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("public key must be 32 bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),

    #[error("invalid token identifier '{0}'")]
    InvalidTokenIdentifier(String),
}

impl From<AddressError> for crate::error::ProxyError {
    fn from(err: AddressError) -> Self {
        Self::Validation(err.to_string())
    }
}
