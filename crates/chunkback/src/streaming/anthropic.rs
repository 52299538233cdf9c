// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Anthropic messages stream (`event:`/`data:` pairs)
//!
//! The stream is one message made of content blocks. Consecutive text chunks
//! share a block; every tool call gets a block of its own. Opening a block of
//! a different kind, or a second tool block, stops the current one first.

use serde_json::{json, Value};

use super::{Framer, Provider, TextUnit, ToolInvocation};

/// Content block lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockState {
    #[default]
    NoBlock,
    InTextBlock { index: usize },
    InToolBlock { index: usize },
}

/// Result of a [`BlockState`] transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: BlockState,
    /// Index of the block that must be stopped first
    pub stop: Option<usize>,
    /// Index of the block that must be started
    pub start: Option<usize>,
}

impl BlockState {
    pub fn index(self) -> Option<usize> {
        match self {
            BlockState::NoBlock => None,
            BlockState::InTextBlock { index } | BlockState::InToolBlock { index } => Some(index),
        }
    }

    /// Index the next new block receives
    fn next_index(self) -> usize {
        self.index().map_or(0, |index| index + 1)
    }

    /// Enter a text block, reusing an open one.
    pub fn to_text(self) -> Transition {
        match self {
            BlockState::InTextBlock { .. } => Transition {
                state: self,
                stop: None,
                start: None,
            },
            _ => {
                let index = self.next_index();
                Transition {
                    state: BlockState::InTextBlock { index },
                    stop: self.index(),
                    start: Some(index),
                }
            }
        }
    }

    /// Enter a fresh tool block.
    pub fn to_tool(self) -> Transition {
        let index = self.next_index();
        Transition {
            state: BlockState::InToolBlock { index },
            stop: self.index(),
            start: Some(index),
        }
    }

    /// Stop whatever is open.
    pub fn to_closed(self) -> Transition {
        Transition {
            state: BlockState::NoBlock,
            stop: self.index(),
            start: None,
        }
    }
}

/// Frames one Anthropic message.
#[derive(Debug)]
pub struct AnthropicFramer {
    message_id: String,
    model: String,
    state: BlockState,
    started: bool,
    ended_with_tool: bool,
    output_tokens: usize,
}

impl AnthropicFramer {
    pub fn new(model: &str) -> Self {
        Self {
            message_id: format!("msg_{}", uuid::Uuid::new_v4().simple()),
            model: model.to_string(),
            state: BlockState::NoBlock,
            started: false,
            ended_with_tool: false,
            output_tokens: 0,
        }
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    fn event(kind: &str, data: Value) -> String {
        format!("event: {kind}\ndata: {data}\n\n")
    }

    fn message_start(&mut self, frames: &mut Vec<String>) {
        if self.started {
            return;
        }
        self.started = true;
        frames.push(Self::event(
            "message_start",
            json!({
                "type": "message_start",
                "message": {
                    "id": self.message_id,
                    "type": "message",
                    "role": "assistant",
                    "content": [],
                    "model": self.model,
                    "stop_reason": null,
                    "stop_sequence": null,
                    "usage": {"input_tokens": 0, "output_tokens": 0},
                }
            }),
        ));
    }

    /// Apply a transition, emitting the stop and returning the started index.
    fn apply(&mut self, transition: Transition, frames: &mut Vec<String>) -> Option<usize> {
        if let Some(index) = transition.stop {
            frames.push(Self::event(
                "content_block_stop",
                json!({"type": "content_block_stop", "index": index}),
            ));
        }
        self.state = transition.state;
        transition.start
    }

    fn block_start(index: usize, content_block: Value) -> String {
        Self::event(
            "content_block_start",
            json!({"type": "content_block_start", "index": index, "content_block": content_block}),
        )
    }

    fn block_delta(&mut self, index: usize, delta: Value) -> String {
        self.output_tokens += 1;
        Self::event(
            "content_block_delta",
            json!({"type": "content_block_delta", "index": index, "delta": delta}),
        )
    }
}

impl Framer for AnthropicFramer {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn text(&mut self, unit: TextUnit<'_>) -> Vec<String> {
        let mut frames = Vec::new();
        self.message_start(&mut frames);

        let transition = self.state.to_text();
        if let Some(index) = self.apply(transition, &mut frames) {
            frames.push(Self::block_start(index, json!({"type": "text", "text": ""})));
        }

        let index = self.state.index().unwrap_or_default();
        let delta = self.block_delta(index, json!({"type": "text_delta", "text": unit.text}));
        frames.push(delta);
        self.ended_with_tool = false;
        frames
    }

    fn tool_call(&mut self, call: ToolInvocation<'_>) -> Vec<String> {
        let mut frames = Vec::new();
        self.message_start(&mut frames);

        let transition = self.state.to_tool();
        let index = self.apply(transition, &mut frames).unwrap_or_default();
        frames.push(Self::block_start(
            index,
            json!({"type": "tool_use", "id": call.call_id, "name": call.tool_name, "input": {}}),
        ));
        let delta = self.block_delta(
            index,
            json!({"type": "input_json_delta", "partial_json": call.arguments}),
        );
        frames.push(delta);
        self.ended_with_tool = true;
        frames
    }

    fn close(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        self.message_start(&mut frames);

        let transition = self.state.to_closed();
        self.apply(transition, &mut frames);

        let stop_reason = if self.ended_with_tool { "tool_use" } else { "end_turn" };
        frames.push(Self::event(
            "message_delta",
            json!({
                "type": "message_delta",
                "delta": {"stop_reason": stop_reason, "stop_sequence": null},
                "usage": {"output_tokens": self.output_tokens},
            }),
        ));
        frames.push(Self::event("message_stop", json!({"type": "message_stop"})));
        frames
    }
}
