// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{HeaderName, Request},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::state::AppState;

pub mod accounts;
pub mod context;
pub mod faucet;
pub mod health;
pub mod transactions;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// UUID v4 request ids.
#[derive(Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(id.parse().ok()?))
    }
}

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/faucet", post(faucet::claim))
        .route("/accounts/{address}", get(accounts::get_account))
        .route(
            "/accounts/{address}/tokens/{identifier}",
            get(accounts::get_account_token),
        )
        .route(
            "/transactions/{hash}/status",
            get(transactions::get_transaction_status),
        )
        .route(
            "/network/status/{shard}",
            get(transactions::get_network_status),
        )
        .route_layer(middleware::from_fn(context::operation_context));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestId))
}
