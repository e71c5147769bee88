// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request [`OperationContext`] middleware.
//!
//! Every request gets a fresh context. A `blockNonce` query parameter pins
//! it to that historical block. Handlers receive the context through
//! `Extension<OperationContext>`, and anything running inside the handler's
//! future can also reach it through [`OperationContext::current`].

use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;
use crate::gateway::OperationContext;

pub const BLOCK_NONCE_PARAM: &str = "blockNonce";

fn block_nonce(query: Option<&str>) -> Result<Option<u64>, ApiError> {
    let Some(query) = query else {
        return Ok(None);
    };

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == BLOCK_NONCE_PARAM)
        .map(|(_, value)| {
            value.parse::<u64>().map_err(|_| {
                ApiError::bad_request(format!("Invalid {BLOCK_NONCE_PARAM} '{value}'"))
            })
        })
        .transpose()
}

pub async fn operation_context(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let context = match block_nonce(request.uri().query())? {
        Some(nonce) => OperationContext::at_block(nonce),
        None => OperationContext::new(),
    };

    request.extensions_mut().insert(context.clone());
    Ok(context.scope(next.run(request)).await)
}
