// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP handlers

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderMap, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chunkback_cbpl::parse_script;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use super::models::{detect_provider, model_list};
use super::prompt::{ChatRequest, GenerateContentRequest};
use super::AppState;
use crate::error::{Error, Result};
use crate::streaming::{stream_commands, ChannelSink, Provider, StreamContext, StreamOutcome};
use crate::tool_cache::MockedToolResponse;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `POST /v1/chat/completions`
pub async fn chat_completions(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let request: ChatRequest = serde_json::from_slice(&body)?;
    let prompt = request.prompt()?;
    start_stream(&state, Provider::OpenAi, request.model, &prompt)
}

/// Azure OpenAI deployment and model routes; the path segment is the model
/// name unless the body names one.
pub async fn azure_chat_completions(
    State(state): State<AppState>,
    Path(deployment): Path<String>,
    body: Bytes,
) -> Result<Response> {
    let request: ChatRequest = serde_json::from_slice(&body)?;
    let prompt = request.prompt()?;
    let model = request.model.or(Some(deployment));
    start_stream(&state, Provider::OpenAi, model, &prompt)
}

/// `POST /v1/messages`
pub async fn messages(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let request: ChatRequest = serde_json::from_slice(&body)?;
    let prompt = request.prompt()?;
    start_stream(&state, Provider::Anthropic, request.model, &prompt)
}

/// `POST /v1[beta]/models/{model}:{action}`
pub async fn generate_content(
    State(state): State<AppState>,
    Path(model_action): Path<String>,
    body: Bytes,
) -> Result<Response> {
    let (model, action) = model_action
        .split_once(':')
        .ok_or_else(|| Error::not_found(format!("Unknown model route '{model_action}'")))?;
    if !matches!(action, "generateContent" | "streamGenerateContent") {
        return Err(Error::not_found(format!("Unsupported Gemini method '{action}'")));
    }

    let request: GenerateContentRequest = serde_json::from_slice(&body)?;
    let prompt = request.prompt()?;
    start_stream(&state, Provider::Gemini, Some(model.to_string()), &prompt)
}

/// `GET` model listings for every provider family
pub async fn list_models(headers: HeaderMap, uri: Uri) -> Json<serde_json::Value> {
    let provider = detect_provider(&headers, uri.query());
    debug!(%provider, "Listing models");
    Json(model_list(provider))
}

/// `GET /v1/tool-responses/{call_id}`
pub async fn tool_response(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<Json<MockedToolResponse>> {
    state
        .tool_cache
        .get(&call_id)
        .await
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("No tool response for call id '{call_id}'")))
}

/// Parse the script and hand it to a background encoder. Parse errors are
/// returned before any byte of the stream is written.
fn start_stream(
    state: &AppState,
    provider: Provider,
    model: Option<String>,
    prompt: &str,
) -> Result<Response> {
    let commands = parse_script(prompt)?;
    let streaming = &state.config.streaming;
    let model = model
        .filter(|model| !model.is_empty())
        .unwrap_or_else(|| streaming.default_model.clone());
    let context = StreamContext::new(model, streaming.default_latency());

    info!(%provider, model = %context.model, commands = commands.len(), "Starting stream");

    // `mpsc::channel` panics on zero capacity.
    let (tx, rx) = mpsc::channel(streaming.channel_capacity.max(1));
    let pacer = state.pacer.clone();
    let cache = state.tool_cache.clone();

    tokio::spawn(async move {
        let mut framer = provider.framer(&context);
        let mut sink = ChannelSink::new(tx);
        let outcome = stream_commands(
            framer.as_mut(),
            commands,
            &context,
            &mut sink,
            pacer.as_ref(),
            cache.as_ref(),
        )
        .await;
        if let StreamOutcome::Completed { frames } = outcome {
            info!(%provider, frames, "Stream completed");
        }
    });

    let headers = [
        (header::CONTENT_TYPE, provider.content_type()),
        (header::CACHE_CONTROL, "no-cache"),
    ];
    Ok((headers, Body::from_stream(ReceiverStream::new(rx))).into_response())
}
