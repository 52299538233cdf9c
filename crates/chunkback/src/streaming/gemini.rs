// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Gemini `generateContent` stream (newline-delimited JSON)

use serde_json::{json, Value};

use super::{Framer, Provider, TextUnit, ToolInvocation};
use crate::tool_cache::structured_arguments;

/// Frames self-contained candidate objects, one per line. The terminal
/// object is written without a trailing newline.
#[derive(Debug, Default)]
pub struct GeminiFramer;

impl GeminiFramer {
    pub fn new() -> Self {
        Self
    }

    fn frame(part: Value, terminal: bool) -> String {
        let mut candidate = json!({
            "content": {"parts": [part], "role": "model"},
            "index": 0,
        });
        if terminal {
            candidate["finishReason"] = json!("STOP");
        }
        let document = json!({ "candidates": [candidate] });
        if terminal {
            document.to_string()
        } else {
            format!("{document}\n")
        }
    }
}

impl Framer for GeminiFramer {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn text(&mut self, unit: TextUnit<'_>) -> Vec<String> {
        vec![Self::frame(json!({ "text": unit.text }), unit.terminal)]
    }

    fn tool_call(&mut self, call: ToolInvocation<'_>) -> Vec<String> {
        let part = json!({
            "functionCall": {
                "name": call.tool_name,
                "args": structured_arguments(call.arguments),
            }
        });
        vec![Self::frame(part, call.terminal)]
    }

    fn close(&mut self) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn text_chunk_is_one_line() {
        let frames = GeminiFramer::new().text(TextUnit {
            text: "Hello",
            first: true,
            terminal: false,
        });
        assert_eq!(frames.len(), 1);
        let line = frames[0].strip_suffix('\n').expect("newline delimited");
        assert!(!line.contains('\n'));
        let value: Value = serde_json::from_str(line).unwrap();
        assert_eq!(
            value,
            json!({"candidates": [{"content": {"parts": [{"text": "Hello"}], "role": "model"}, "index": 0}]})
        );
    }

    #[test]
    fn terminal_chunk_sets_finish_reason_without_newline() {
        let frames = GeminiFramer::new().text(TextUnit {
            text: "end",
            first: false,
            terminal: true,
        });
        assert!(!frames[0].ends_with('\n'));
        let value: Value = serde_json::from_str(&frames[0]).unwrap();
        assert_eq!(value["candidates"][0]["finishReason"], "STOP");
    }

    #[test]
    fn function_call_arguments_are_structured() {
        let mut framer = GeminiFramer::new();
        let call = ToolInvocation {
            call_id: "call_1",
            tool_name: "get_weather",
            arguments: r#"{"city":"Paris"}"#,
            chunk_size: 2,
            first: true,
            terminal: true,
        };
        let frames = framer.tool_call(call);
        assert_eq!(frames.len(), 1);
        let value: Value = serde_json::from_str(&frames[0]).unwrap();
        assert_eq!(
            value["candidates"][0]["content"]["parts"][0],
            json!({"functionCall": {"name": "get_weather", "args": {"city": "Paris"}}})
        );

        let frames = framer.tool_call(ToolInvocation {
            arguments: "San Francisco",
            ..call
        });
        let value: Value = serde_json::from_str(&frames[0]).unwrap();
        assert_eq!(
            value["candidates"][0]["content"]["parts"][0]["functionCall"]["args"],
            json!({"value": "San Francisco"})
        );
    }

    #[test]
    fn close_adds_nothing() {
        assert!(GeminiFramer::new().close().is_empty());
    }
}
