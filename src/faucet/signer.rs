// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Faucet transaction format and signing.
//!
//! The faucet account is an ed25519 key. A transaction is signed over its
//! canonical JSON form (fields in declaration order, no signature, empty
//! data omitted) and sent with the hex signature attached.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{Signer, SigningKey};
use serde::Serialize;
use serde_json::Value;

use crate::address::{bech32_encode, strip_hex_prefix};

const SEED_LEN: usize = 32;
const TRANSACTION_VERSION: u32 = 1;

/// Something that can sign faucet transactions.
pub trait TransactionSigner: Send + Sync {
    /// Native address of the signing account.
    fn address(&self) -> &str;

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;
}

/// ed25519 signer built from a hex seed.
pub struct Ed25519Signer {
    key: SigningKey,
    address: String,
}

impl Ed25519Signer {
    /// Accepts a 32-byte seed, or a 64-byte seed + public key pair of which
    /// only the seed is used.
    pub fn from_hex(secret_hex: &str) -> Result<Self, SignerError> {
        let bytes = alloy::hex::decode(strip_hex_prefix(secret_hex.trim()))
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        let seed: [u8; SEED_LEN] = match bytes.len() {
            32 | 64 => bytes[..SEED_LEN]
                .try_into()
                .map_err(|_| SignerError::InvalidKey("bad seed length".to_string()))?,
            n => {
                return Err(SignerError::InvalidKey(format!(
                    "expected 32 or 64 bytes, got {n}"
                )))
            }
        };

        let key = SigningKey::from_bytes(&seed);
        let address = bech32_encode(&alloy::hex::encode(key.verifying_key().to_bytes()))
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;

        Ok(Self { key, address })
    }
}

impl TransactionSigner for Ed25519Signer {
    fn address(&self) -> &str {
        &self.address
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        Ok(self.key.sign(message).to_bytes().to_vec())
    }
}

/// Transfer transaction in its wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub nonce: u64,
    /// Base units, decimal string.
    pub value: String,
    pub receiver: String,
    pub sender: String,
    pub gas_price: u64,
    pub gas_limit: u64,
    /// Base64 payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(rename = "chainID")]
    pub chain_id: String,
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Transaction {
    pub fn new(
        nonce: u64,
        value: impl Into<String>,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        gas_price: u64,
        gas_limit: u64,
        chain_id: impl Into<String>,
    ) -> Self {
        Self {
            nonce,
            value: value.into(),
            receiver: receiver.into(),
            sender: sender.into(),
            gas_price,
            gas_limit,
            data: None,
            chain_id: chain_id.into(),
            version: TRANSACTION_VERSION,
            signature: None,
        }
    }

    /// Attach a plain-text payload. An empty payload is omitted.
    pub fn with_data(mut self, data: &str) -> Self {
        self.data = (!data.is_empty()).then(|| STANDARD.encode(data));
        self
    }

    /// Bytes covered by the signature.
    pub fn serialize_for_signing(&self) -> Result<Vec<u8>, SignerError> {
        let unsigned = Self {
            signature: None,
            ..self.clone()
        };
        serde_json::to_vec(&unsigned).map_err(|e| SignerError::Encoding(e.to_string()))
    }

    pub fn sign(&mut self, signer: &dyn TransactionSigner) -> Result<(), SignerError> {
        let signature = signer.sign(&self.serialize_for_signing()?)?;
        self.signature = Some(alloy::hex::encode(signature));
        Ok(())
    }

    /// JSON body for `transaction/send`.
    pub fn to_sendable(&self) -> Result<Value, SignerError> {
        serde_json::to_value(self).map_err(|e| SignerError::Encoding(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("Invalid faucet key: {0}")]
    InvalidKey(String),

    #[error("Failed to encode transaction: {0}")]
    Encoding(String),
}

impl From<SignerError> for crate::error::ProxyError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::InvalidKey(_) => Self::FaucetDisabled,
            SignerError::Encoding(message) => Self::Validation(message),
        }
    }
}
