// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Store of mocked tool responses keyed by the call id emitted on the wire

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::streaming::Provider;

/// What the server recorded when it emitted a tool call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockedToolResponse {
    pub call_id: String,
    pub tool_name: String,
    /// Arguments exactly as written in the script
    pub arguments: String,
    /// Arguments as JSON; non-object input is wrapped as `{"value": raw}`
    pub parsed_arguments: Value,
    pub provider: Provider,
    pub created_at: String,
}

impl MockedToolResponse {
    pub fn new(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: impl Into<String>,
        provider: Provider,
    ) -> Self {
        let arguments = arguments.into();
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            parsed_arguments: structured_arguments(&arguments),
            arguments,
            provider,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Parse raw tool arguments as a JSON object, wrapping anything else.
pub fn structured_arguments(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        _ => serde_json::json!({ "value": raw }),
    }
}

/// Concurrent store written by the encoders and read by the lookup endpoint
#[async_trait]
pub trait ToolResponseCache: Send + Sync {
    async fn put(&self, call_id: &str, response: MockedToolResponse);

    async fn get(&self, call_id: &str) -> Option<MockedToolResponse>;
}

/// Process-wide in-memory cache
#[derive(Debug, Clone, Default)]
pub struct InMemoryToolCache {
    entries: Arc<RwLock<HashMap<String, MockedToolResponse>>>,
}

impl InMemoryToolCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ToolResponseCache for InMemoryToolCache {
    async fn put(&self, call_id: &str, response: MockedToolResponse) {
        self.entries.write().await.insert(call_id.to_string(), response);
    }

    async fn get(&self, call_id: &str) -> Option<MockedToolResponse> {
        self.entries.read().await.get(call_id).cloned()
    }
}
