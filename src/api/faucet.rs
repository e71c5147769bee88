// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::ApiError;
use crate::faucet::FaucetReceipt;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FaucetRequest {
    /// Native or EVM-format address of the claimant.
    #[serde(default)]
    pub address: Option<String>,
}

/// Send test tokens to the requested address.
pub async fn claim(
    State(state): State<AppState>,
    Json(request): Json<FaucetRequest>,
) -> Result<Json<FaucetReceipt>, ApiError> {
    let receipt = state
        .faucet
        .send_tokens_to_address(request.address.as_deref())
        .await?;

    Ok(Json(receipt))
}
