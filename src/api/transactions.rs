// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::address::parse_transaction_hash;
use crate::error::ApiError;
use crate::gateway::{OperationContext, TransactionProcessStatus};
use crate::state::AppState;

/// Processing status of a transaction.
pub async fn get_transaction_status(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(hash): Path<String>,
) -> Result<Json<TransactionProcessStatus>, ApiError> {
    let hash = parse_transaction_hash(&hash).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let status = state
        .gateway
        .get_transaction_process_status(&context, &hash)
        .await?
        .ok_or_else(|| ApiError::not_found("Transaction not found"))?;

    Ok(Json(status))
}

/// Network status of one shard (or the metachain, `4294967295`).
pub async fn get_network_status(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(shard): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let shard: u32 = shard
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid shard '{shard}'")))?;

    let status = state
        .gateway
        .get_network_status(&context, &shard.to_string())
        .await?
        .ok_or_else(|| ApiError::not_found("Network status not available"))?;

    Ok(Json(status))
}
