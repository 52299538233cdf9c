// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Statement and executable command types

use serde::Serialize;

/// One parsed CBPL statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Say { content: String },
    ToolCall { tool_name: String, arguments: String },
    /// `0` resets to the whole-content default.
    ChunkSize { size: usize },
    ChunkLatency { latency_ms: u64 },
    RandomLatency { min_ms: u64, max_ms: u64 },
}

/// Directives that produce output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Directive {
    #[serde(rename = "SAY")]
    Say { content: String },
    #[serde(rename = "TOOLCALL", rename_all = "camelCase")]
    ToolCall { tool_name: String, arguments: String },
}

/// An output directive paired with the chunking configuration in effect
/// where it appeared in the script. `None` means "use the encoder default".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableCommand {
    #[serde(rename = "command")]
    pub directive: Directive,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_latency_ms: Option<(u64, u64)>,
}

impl ExecutableCommand {
    pub fn say(content: impl Into<String>) -> Self {
        Self::new(Directive::Say {
            content: content.into(),
        })
    }

    pub fn tool_call(tool_name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self::new(Directive::ToolCall {
            tool_name: tool_name.into(),
            arguments: arguments.into(),
        })
    }

    fn new(directive: Directive) -> Self {
        Self {
            directive,
            chunk_size: None,
            chunk_latency_ms: None,
            random_latency_ms: None,
        }
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    pub fn with_chunk_latency(mut self, latency_ms: u64) -> Self {
        self.chunk_latency_ms = Some(latency_ms);
        self
    }

    pub fn with_random_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.random_latency_ms = Some((min_ms, max_ms));
        self
    }

    pub fn is_tool_call(&self) -> bool {
        matches!(self.directive, Directive::ToolCall { .. })
    }
}
