// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! OpenAI chat completion chunks (`data: <json>` server-sent events)

use serde::Serialize;

use super::{Framer, Provider, TextUnit, ToolInvocation};
use crate::chunking::chunk_text;

/// Sentinel line closing every OpenAI stream
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

#[derive(Debug, Serialize)]
struct ChatCompletionChunk<'a> {
    id: &'a str,
    object: &'static str,
    created: i64,
    model: &'a str,
    choices: [ChunkChoice<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChunkChoice<'a> {
    index: u32,
    delta: Delta<'a>,
    finish_reason: Option<&'static str>,
}

#[derive(Debug, Default, Serialize)]
struct Delta<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<[ToolCallDelta<'a>; 1]>,
}

#[derive(Debug, Serialize)]
struct ToolCallDelta<'a> {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    function: FunctionDelta<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionDelta<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    arguments: &'a str,
}

/// Frames `chat.completion.chunk` objects sharing one completion id.
#[derive(Debug)]
pub struct OpenAiFramer {
    id: String,
    model: String,
    created: i64,
    tool_calls: usize,
}

impl OpenAiFramer {
    pub fn new(model: &str) -> Self {
        Self {
            id: format!("chatcmpl-{}", uuid::Uuid::new_v4().simple()),
            model: model.to_string(),
            created: chrono::Utc::now().timestamp(),
            tool_calls: 0,
        }
    }

    pub fn completion_id(&self) -> &str {
        &self.id
    }

    fn frame(&self, delta: Delta<'_>, finish_reason: Option<&'static str>) -> String {
        let chunk = ChatCompletionChunk {
            id: &self.id,
            object: "chat.completion.chunk",
            created: self.created,
            model: &self.model,
            choices: [ChunkChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        };
        // Plain borrowed strings and numbers always serialize.
        let json = serde_json::to_string(&chunk).unwrap_or_default();
        format!("data: {json}\n\n")
    }
}

fn role(first: bool) -> Option<&'static str> {
    first.then_some("assistant")
}

impl Framer for OpenAiFramer {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn text(&mut self, unit: TextUnit<'_>) -> Vec<String> {
        let delta = Delta {
            role: role(unit.first),
            content: Some(unit.text),
            tool_calls: None,
        };
        vec![self.frame(delta, unit.terminal.then_some("stop"))]
    }

    fn tool_call(&mut self, call: ToolInvocation<'_>) -> Vec<String> {
        let index = self.tool_calls;
        self.tool_calls += 1;

        let pieces = chunk_text(call.arguments, call.chunk_size);
        let final_piece = pieces.len() - 1;

        pieces
            .iter()
            .enumerate()
            .map(|(position, piece)| {
                let opening = position == 0;
                let tool_call = ToolCallDelta {
                    index,
                    id: opening.then_some(call.call_id),
                    kind: opening.then_some("function"),
                    function: FunctionDelta {
                        name: opening.then_some(call.tool_name),
                        arguments: piece,
                    },
                };
                let delta = Delta {
                    role: role(call.first && opening),
                    content: None,
                    tool_calls: Some([tool_call]),
                };
                let finish = (call.terminal && position == final_piece).then_some("tool_calls");
                self.frame(delta, finish)
            })
            .collect()
    }

    fn close(&mut self) -> Vec<String> {
        vec![DONE_FRAME.to_string()]
    }
}
