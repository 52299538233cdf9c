// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Optional API key check

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::AppState;
use crate::error::{Error, Result};

/// Look up one query string parameter.
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Key presented by any of the schemes the emulated APIs use
pub fn presented_key(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    if let Some(token) =
        header(AUTHORIZATION.as_str()).and_then(|value| value.strip_prefix("Bearer "))
    {
        return Some(token.trim().to_string());
    }
    header("x-api-key")
        .or_else(|| header("x-goog-api-key"))
        .map(str::to_string)
        .or_else(|| query_param(query, "key"))
}

/// Reject requests without a configured key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let key = presented_key(request.headers(), request.uri().query());
    match key {
        Some(key) if state.config.security.accepts(&key) => Ok(next.run(request).await),
        Some(_) => {
            debug!(path = %request.uri().path(), "Rejected unknown API key");
            Err(Error::unauthorized("Invalid API key"))
        }
        None => Err(Error::unauthorized("Missing API key")),
    }
}
