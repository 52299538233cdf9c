// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Fake model listings

use axum::http::HeaderMap;
use serde_json::{json, Value};

use super::auth::query_param;
use crate::streaming::Provider;

/// Guess which API a model-listing client speaks from its credentials.
pub fn detect_provider(headers: &HeaderMap, query: Option<&str>) -> Provider {
    if headers.contains_key("x-api-key") || headers.contains_key("anthropic-version") {
        Provider::Anthropic
    } else if headers.contains_key("x-goog-api-key") || query_param(query, "key").is_some() {
        Provider::Gemini
    } else {
        Provider::OpenAi
    }
}

pub fn model_list(provider: Provider) -> Value {
    match provider {
        Provider::OpenAi => openai_models(),
        Provider::Anthropic => anthropic_models(),
        Provider::Gemini => gemini_models(),
    }
}

fn openai_models() -> Value {
    let models = [
        ("gpt-4o", 1715367049, "system"),
        ("gpt-4o-mini", 1721172741, "system"),
        ("gpt-4-turbo", 1712361441, "system"),
        ("gpt-4", 1687882411, "openai"),
        ("gpt-3.5-turbo", 1677610602, "openai"),
        ("o1-preview", 1725648070, "system"),
        ("o1-mini", 1725648069, "system"),
    ];
    let data: Vec<Value> = models
        .iter()
        .map(|(id, created, owned_by)| {
            json!({"id": id, "object": "model", "created": created, "owned_by": owned_by})
        })
        .collect();
    json!({"object": "list", "data": data})
}

fn anthropic_models() -> Value {
    let models = [
        ("claude-sonnet-4-5-20250929", "Claude Sonnet 4.5", "2025-09-29T00:00:00Z"),
        ("claude-sonnet-4-20250514", "Claude Sonnet 4", "2025-05-14T00:00:00Z"),
        ("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet", "2024-10-22T00:00:00Z"),
        ("claude-3-5-haiku-20241022", "Claude 3.5 Haiku", "2024-10-22T00:00:00Z"),
        ("claude-3-opus-20240229", "Claude 3 Opus", "2024-02-29T00:00:00Z"),
    ];
    let data: Vec<Value> = models
        .iter()
        .map(|(id, display_name, created_at)| {
            json!({"id": id, "display_name": display_name, "created_at": created_at, "type": "model"})
        })
        .collect();
    json!({
        "data": data,
        "first_id": models[0].0,
        "has_more": false,
        "last_id": models[models.len() - 1].0,
    })
}

fn gemini_models() -> Value {
    let models = [
        (
            "gemini-2.5-flash",
            "Gemini 2.5 Flash",
            "Fast and versatile performance across a diverse variety of tasks",
            1_048_576,
            64,
        ),
        (
            "gemini-2.0-flash-exp",
            "Gemini 2.0 Flash Experimental",
            "Experimental multimodal model with advanced capabilities",
            1_048_576,
            40,
        ),
        (
            "gemini-1.5-pro",
            "Gemini 1.5 Pro",
            "Mid-size multimodal model that supports up to 2 million tokens",
            2_097_152,
            64,
        ),
        (
            "gemini-1.5-flash",
            "Gemini 1.5 Flash",
            "Fast and versatile multimodal model for scaling across diverse tasks",
            1_048_576,
            64,
        ),
        (
            "gemini-1.5-flash-8b",
            "Gemini 1.5 Flash-8B",
            "Smaller, faster model for high-frequency tasks",
            1_048_576,
            40,
        ),
    ];
    let models: Vec<Value> = models
        .iter()
        .map(|(name, display_name, description, input_limit, top_k)| {
            json!({
                "name": format!("models/{name}"),
                "displayName": display_name,
                "description": description,
                "inputTokenLimit": input_limit,
                "outputTokenLimit": 8192,
                "supportedGenerationMethods": ["generateContent", "streamGenerateContent", "countTokens"],
                "temperature": 1.0,
                "maxTemperature": 2.0,
                "topP": 0.95,
                "topK": top_k,
            })
        })
        .collect();
    json!({ "models": models })
}
