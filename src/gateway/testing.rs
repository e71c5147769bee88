// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process transport double shared by the gateway, faucet and API tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::transport::{HttpTransport, UpstreamFailure};
use crate::config::GatewayEndpoints;

/// Endpoints used throughout the tests.
pub(crate) fn endpoints(snapshotless: bool, deep_history: bool) -> GatewayEndpoints {
    GatewayEndpoints {
        default: Url::parse("https://gateway.test").unwrap(),
        snapshotless: snapshotless.then(|| Url::parse("https://snapshotless.test").unwrap()),
        deep_history: deep_history.then(|| Url::parse("https://deep.test").unwrap()),
    }
}

/// Replays canned answers keyed by URL path (no leading slash, no query)
/// and records every request it sees.
#[derive(Default)]
pub(crate) struct FakeTransport {
    answers: Mutex<HashMap<String, Result<Value, UpstreamFailure>>>,
    urls: Mutex<Vec<String>>,
    bodies: Mutex<Vec<Value>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, path: &str, body: Value) {
        self.answers
            .lock()
            .unwrap()
            .insert(path.to_string(), Ok(body));
    }

    pub(crate) fn fail(&self, path: &str, failure: UpstreamFailure) {
        self.answers
            .lock()
            .unwrap()
            .insert(path.to_string(), Err(failure));
    }

    pub(crate) fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub(crate) fn requested_bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self, path: &str) -> usize {
        self.urls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|raw| Url::parse(raw).ok())
            .filter(|url| url.path().trim_start_matches('/') == path)
            .count()
    }

    fn answer(&self, url: &Url) -> Result<Value, UpstreamFailure> {
        self.urls.lock().unwrap().push(url.to_string());
        let path = url.path().trim_start_matches('/');
        self.answers
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| {
                Err(UpstreamFailure::new(
                    Some(404),
                    format!("no canned answer for {path}"),
                ))
            })
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &Url) -> Result<Value, UpstreamFailure> {
        self.answer(url)
    }

    async fn post(&self, url: &Url, body: &Value) -> Result<Value, UpstreamFailure> {
        self.bodies.lock().unwrap().push(body.clone());
        self.answer(url)
    }
}
