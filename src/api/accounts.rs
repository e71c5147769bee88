// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::address::{parse_token_identifier, AddressInput};
use crate::error::ApiError;
use crate::gateway::OperationContext;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_address: Option<String>,
    pub balance: String,
    pub nonce: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Block the answer was read at, for `blockNonce` queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_info: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceResponse {
    pub address: String,
    pub identifier: String,
    pub token: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_info: Option<Value>,
}

/// Resolve either address form to the native account address, under the
/// request's ambient context.
async fn native_address(
    state: &AppState,
    input: &str,
) -> Result<(String, Option<String>), ApiError> {
    let parsed = AddressInput::parse(input).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let context = OperationContext::current_or_new();
    let (native, alias) = state.aliases.resolve_both_for(&context, parsed.as_str()).await;
    let native = native.ok_or_else(|| ApiError::not_found("Account not found"))?;
    Ok((native, alias))
}

/// Account details, optionally at a historical block (`?blockNonce=`).
pub async fn get_account(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(address): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let (native, alias_address) = native_address(&state, &address).await?;

    let account = state
        .gateway
        .get_account(&context, &native)
        .await?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;

    Ok(Json(AccountResponse {
        address: account.address,
        alias_address,
        balance: account.balance,
        nonce: account.nonce,
        username: account.username,
        block_info: context.deep_history_block_info(),
    }))
}

/// Balance of one token for an account.
pub async fn get_account_token(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path((address, identifier)): Path<(String, String)>,
) -> Result<Json<TokenBalanceResponse>, ApiError> {
    let identifier =
        parse_token_identifier(&identifier).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let (native, _) = native_address(&state, &address).await?;

    let token = state
        .gateway
        .get_address_esdt(&context, &native, &identifier)
        .await?
        .ok_or_else(|| ApiError::not_found("Token for given account not found"))?;

    Ok(Json(TokenBalanceResponse {
        address: native,
        identifier,
        token,
        block_info: context.deep_history_block_info(),
    }))
}
