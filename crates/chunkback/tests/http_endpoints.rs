// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Router-level tests driving every endpoint in-process

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chunkback::streaming::InstantPacer;
use chunkback::{build_router, AppState, ChunkbackConfig};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_config() -> ChunkbackConfig {
    let mut config = ChunkbackConfig::default();
    config.streaming.default_chunk_latency_ms = 0;
    config
}

fn router_with(config: ChunkbackConfig) -> Router {
    let state = AppState::new(config).with_pacer(Arc::new(InstantPacer::new()));
    build_router(state)
}

fn router() -> Router {
    router_with(test_config())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn user_prompt(prompt: &str) -> Value {
    json!({"model": "gpt-4o", "messages": [{"role": "user", "content": prompt}]})
}

fn openai_payloads(body: &str) -> Vec<Value> {
    body.split("\n\n")
        .filter_map(|frame| frame.strip_prefix("data: "))
        .filter(|data| *data != "[DONE]")
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

#[tokio::test]
async fn health_reports_ok() {
    let response = router().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn openai_stream_echoes_say() {
    let response = router()
        .oneshot(post_json("/v1/chat/completions", user_prompt("SAY \"Hello World\"")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_text(response).await;
    assert!(body.ends_with("data: [DONE]\n\n"));

    let payloads = openai_payloads(&body);
    assert!(!payloads.is_empty());
    let content: String = payloads
        .iter()
        .filter_map(|chunk| chunk["choices"][0]["delta"]["content"].as_str())
        .collect();
    assert_eq!(content, "Hello World");
    assert_eq!(payloads[0]["model"], "gpt-4o");
    assert_eq!(payloads[0]["choices"][0]["delta"]["role"], "assistant");
}

#[tokio::test]
async fn openai_default_model_is_echo_model() {
    let response = router()
        .oneshot(post_json(
            "/v1/chat/completions",
            json!({"messages": [{"role": "user", "content": "SAY \"x\""}]}),
        ))
        .await
        .unwrap();
    let payloads = openai_payloads(&body_text(response).await);
    assert_eq!(payloads[0]["model"], "echo-model");
}

#[tokio::test]
async fn azure_routes_use_path_as_model() {
    for uri in [
        "/openai/deployments/my-deployment/chat/completions",
        "/openai/models/my-deployment/chat/completions",
    ] {
        let response = router()
            .oneshot(post_json(
                uri,
                json!({"messages": [{"role": "user", "content": "SAY \"hi\""}]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let payloads = openai_payloads(&body_text(response).await);
        assert_eq!(payloads[0]["model"], "my-deployment");
    }
}

#[tokio::test]
async fn anthropic_stream_has_message_lifecycle() {
    let response = router()
        .oneshot(post_json(
            "/v1/messages",
            json!({
                "model": "claude-3-5-sonnet-20241022",
                "max_tokens": 100,
                "messages": [{"role": "user", "content": [{"type": "text", "text": "SAY \"Hi\""}]}]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

    let body = body_text(response).await;
    let events: Vec<&str> = body
        .lines()
        .filter_map(|line| line.strip_prefix("event: "))
        .collect();
    assert_eq!(
        events,
        vec![
            "message_start",
            "content_block_start",
            "content_block_delta",
            "content_block_stop",
            "message_delta",
            "message_stop",
        ]
    );
    assert!(body.contains("\"model\":\"claude-3-5-sonnet-20241022\""));
}

#[tokio::test]
async fn gemini_generate_content_streams_ndjson() {
    for uri in [
        "/v1/models/gemini-1.5-pro:generateContent",
        "/v1beta/models/gemini-1.5-pro:streamGenerateContent",
    ] {
        let response = router()
            .oneshot(post_json(
                uri,
                json!({"contents": [{"role": "user", "parts": [{"text": "CHUNKSIZE 2\nSAY \"abc\""}]}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body = body_text(response).await;
        let lines: Vec<Value> = body
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["candidates"][0]["content"]["parts"][0]["text"], "ab");
        assert_eq!(lines[1]["candidates"][0]["content"]["parts"][0]["text"], "c");
        assert_eq!(lines[1]["candidates"][0]["finishReason"], "STOP");
        assert!(lines[0]["candidates"][0].get("finishReason").is_none());
    }
}

#[tokio::test]
async fn zero_channel_capacity_still_streams() {
    let mut config = test_config();
    config.streaming.channel_capacity = 0;

    let response = router_with(config)
        .oneshot(post_json("/v1/chat/completions", user_prompt("CHUNKSIZE 1\nSAY \"abc\"")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.ends_with("data: [DONE]\n\n"));
    assert_eq!(openai_payloads(&body).len(), 3);
}

#[tokio::test]
async fn gemini_unknown_method_is_not_found() {
    let request = json!({"contents": [{"role": "user", "parts": [{"text": "SAY \"a\""}]}]});
    for uri in ["/v1/models/gemini-1.5-pro:countTokens", "/v1/models/gemini-1.5-pro"] {
        let response = router().oneshot(post_json(uri, request.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn parse_errors_fail_before_streaming() {
    let response = router()
        .oneshot(post_json("/v1/chat/completions", user_prompt("SAY")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"]["type"], "parse_error");
    assert_eq!(
        body["error"]["message"],
        "Parse error at line 1, column 4: Expected string after SAY"
    );
}

#[tokio::test]
async fn malformed_requests_are_rejected() {
    let cases = [
        ("/v1/chat/completions", json!({})),
        ("/v1/chat/completions", json!({"messages": [{"role": "system", "content": "x"}]})),
        ("/v1/messages", json!({"messages": []})),
        ("/v1/models/gemini-pro:generateContent", json!({"contents": []})),
    ];
    for (uri, body) in cases {
        let response = router().oneshot(post_json(uri, body.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri} {body}");
    }

    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat/completions")
        .body(Body::from("not json"))
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_program_streams_diagnostic() {
    let response = router()
        .oneshot(post_json("/v1/chat/completions", user_prompt("just some words")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let payloads = openai_payloads(&body_text(response).await);
    assert_eq!(payloads.len(), 1);
    assert_eq!(
        payloads[0]["choices"][0]["delta"]["content"],
        "No valid commands found in prompt"
    );
    assert_eq!(payloads[0]["choices"][0]["finish_reason"], "stop");
}

#[tokio::test]
async fn model_listing_follows_headers() {
    let response = router().oneshot(get("/v1/models")).await.unwrap();
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["object"], "list");

    let request = Request::builder()
        .uri("/v1/models")
        .header("anthropic-version", "2023-06-01")
        .body(Body::empty())
        .unwrap();
    let body: Value =
        serde_json::from_str(&body_text(router().oneshot(request).await.unwrap()).await).unwrap();
    assert_eq!(body["has_more"], false);

    let response = router().oneshot(get("/v1beta/models?key=abc")).await.unwrap();
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["models"].is_array());

    for uri in ["/openai/models", "/openai/deployments"] {
        let response = router().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn tool_responses_are_retrievable_by_wire_id() {
    let app = router();
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/chat/completions",
            user_prompt(r#"TOOLCALL "get_weather" "{\"city\":\"Paris\"}""#),
        ))
        .await
        .unwrap();
    let payloads = openai_payloads(&body_text(response).await);
    let call_id = payloads[0]["choices"][0]["delta"]["tool_calls"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(call_id.starts_with("call_"));

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/tool-responses/{call_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stored: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(stored["toolName"], "get_weather");
    assert_eq!(stored["parsedArguments"], json!({"city": "Paris"}));
    assert_eq!(stored["provider"], "openai");

    let response = app.oneshot(get("/v1/tool-responses/call_missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_keys_guard_everything_but_health() {
    let mut config = test_config();
    config.security.api_keys = vec!["secret".to_string()];
    let app = router_with(config);

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json("/v1/chat/completions", user_prompt("SAY \"x\"")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"]["type"], "authentication_error");

    let mut request = post_json("/v1/chat/completions", user_prompt("SAY \"x\""));
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer wrong".parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut request = post_json("/v1/chat/completions", user_prompt("SAY \"x\""));
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer secret".parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut request = post_json("/v1/messages", user_prompt("SAY \"x\""));
    request.headers_mut().insert("x-api-key", "secret".parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_json(
            "/v1beta/models/gemini-pro:generateContent?key=secret",
            json!({"contents": [{"parts": [{"text": "SAY \"x\""}]}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn cors_preflight_is_answered_when_enabled() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/v1/chat/completions")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
