// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Provider stream encoding
//!
//! Every provider shares one driver, [`stream_commands`], that walks the
//! executable command list in order, splits text into chunks, paces them and
//! records tool calls in the cache. The provider-specific part is a
//! synchronous [`Framer`] that turns each emitted unit into wire frames.

use std::time::Duration;

use chunkback_cbpl::{Directive, ExecutableCommand};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::chunking::{chunk_text, effective_chunk_size};
use crate::tool_cache::{MockedToolResponse, ToolResponseCache};

pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod pacing;
pub mod sink;

pub use anthropic::{AnthropicFramer, BlockState};
pub use gemini::GeminiFramer;
pub use openai::OpenAiFramer;
pub use pacing::{InstantPacer, Pacer, TokioPacer};
pub use sink::{ChannelSink, FrameSink, VecSink};

/// Text streamed when a script contains no output directives
pub const EMPTY_PROGRAM_MESSAGE: &str = "No valid commands found in prompt";

/// Wire format family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Gemini,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        }
    }

    /// Response `Content-Type` of a streamed reply
    pub fn content_type(self) -> &'static str {
        match self {
            Provider::OpenAi | Provider::Anthropic => "text/event-stream",
            Provider::Gemini => "application/json",
        }
    }

    /// Fresh tool call id in the provider's usual shape
    pub fn new_call_id(self) -> String {
        let id = uuid::Uuid::new_v4().simple();
        match self {
            Provider::Anthropic => format!("toolu_{id}"),
            Provider::OpenAi | Provider::Gemini => format!("call_{id}"),
        }
    }

    /// Frame encoder for one response
    pub fn framer(self, context: &StreamContext) -> Box<dyn Framer> {
        match self {
            Provider::OpenAi => Box::new(OpenAiFramer::new(&context.model)),
            Provider::Anthropic => Box::new(AnthropicFramer::new(&context.model)),
            Provider::Gemini => Box::new(GeminiFramer::new()),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-request encoding parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamContext {
    /// Model name echoed in the stream
    pub model: String,
    /// Pause used when a command sets no latency
    pub default_latency: Duration,
}

impl StreamContext {
    pub fn new(model: impl Into<String>, default_latency: Duration) -> Self {
        Self {
            model: model.into(),
            default_latency,
        }
    }
}

/// How a stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed { frames: usize },
    ClientDisconnected { frames: usize },
}

impl StreamOutcome {
    pub fn frames(self) -> usize {
        match self {
            StreamOutcome::Completed { frames } | StreamOutcome::ClientDisconnected { frames } => {
                frames
            }
        }
    }
}

/// One chunk of `SAY` output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextUnit<'a> {
    pub text: &'a str,
    /// First unit of the whole response
    pub first: bool,
    /// Last unit of the whole response
    pub terminal: bool,
}

/// One `TOOLCALL`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolInvocation<'a> {
    pub call_id: &'a str,
    pub tool_name: &'a str,
    pub arguments: &'a str,
    /// Piece size for providers that stream arguments incrementally
    pub chunk_size: usize,
    pub first: bool,
    pub terminal: bool,
}

/// Provider-specific framing state machine.
///
/// Methods return complete wire frames ready to be written in order.
pub trait Framer: Send {
    fn provider(&self) -> Provider;

    fn text(&mut self, unit: TextUnit<'_>) -> Vec<String>;

    fn tool_call(&mut self, call: ToolInvocation<'_>) -> Vec<String>;

    /// Frames that end the response after the terminal unit
    fn close(&mut self) -> Vec<String>;
}

/// Pause before a text chunk: fixed latency, else a draw from the random
/// range, else the default.
pub fn resolve_latency(command: &ExecutableCommand, default: Duration) -> Duration {
    if let Some(latency_ms) = command.chunk_latency_ms {
        return Duration::from_millis(latency_ms);
    }
    if let Some((min_ms, max_ms)) = command.random_latency_ms {
        let (low, high) = (min_ms.min(max_ms), min_ms.max(max_ms));
        return Duration::from_millis(rand::thread_rng().gen_range(low..=high));
    }
    default
}

struct Emitter<'s> {
    sink: &'s mut dyn FrameSink,
    frames: usize,
}

impl Emitter<'_> {
    async fn emit(&mut self, frames: Vec<String>) -> bool {
        for frame in frames {
            if !self.sink.send(frame).await {
                return false;
            }
            self.frames += 1;
        }
        true
    }

    /// Wait unless the reader goes away first.
    async fn pause(&self, pacer: &dyn Pacer, delay: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.sink.closed() => false,
            _ = pacer.pause(delay) => true,
        }
    }

    fn disconnected(&self, provider: Provider) -> StreamOutcome {
        warn!(%provider, frames = self.frames, "Client disconnected mid-stream");
        StreamOutcome::ClientDisconnected {
            frames: self.frames,
        }
    }
}

/// Drain `commands` through `framer` into `sink`.
///
/// Text chunks after the first unit of the response are preceded by the
/// command's latency; tool calls are never delayed. Each tool call is stored
/// in `cache` before its frames are written.
pub async fn stream_commands(
    framer: &mut dyn Framer,
    commands: Vec<ExecutableCommand>,
    context: &StreamContext,
    sink: &mut dyn FrameSink,
    pacer: &dyn Pacer,
    cache: &dyn ToolResponseCache,
) -> StreamOutcome {
    let provider = framer.provider();
    let mut emitter = Emitter { sink, frames: 0 };

    if commands.is_empty() {
        debug!(%provider, "Empty program, streaming diagnostic");
        let frames = framer.text(TextUnit {
            text: EMPTY_PROGRAM_MESSAGE,
            first: true,
            terminal: true,
        });
        if !emitter.emit(frames).await || !emitter.emit(framer.close()).await {
            return emitter.disconnected(provider);
        }
        return StreamOutcome::Completed {
            frames: emitter.frames,
        };
    }

    let last = commands.len() - 1;
    let mut first = true;

    for (position, command) in commands.into_iter().enumerate() {
        let is_last = position == last;
        let latency = resolve_latency(&command, context.default_latency);

        match &command.directive {
            Directive::Say { content } => {
                let size = effective_chunk_size(content, command.chunk_size);
                let chunks = chunk_text(content, size);
                let final_chunk = chunks.len() - 1;

                for (index, chunk) in chunks.iter().enumerate() {
                    if !first && !emitter.pause(pacer, latency).await {
                        return emitter.disconnected(provider);
                    }
                    let frames = framer.text(TextUnit {
                        text: chunk,
                        first,
                        terminal: is_last && index == final_chunk,
                    });
                    first = false;
                    if !emitter.emit(frames).await {
                        return emitter.disconnected(provider);
                    }
                }
            }
            Directive::ToolCall {
                tool_name,
                arguments,
            } => {
                let call_id = provider.new_call_id();
                cache
                    .put(
                        &call_id,
                        MockedToolResponse::new(&call_id, tool_name, arguments, provider),
                    )
                    .await;
                debug!(%provider, %call_id, tool_name, "Recorded mocked tool response");

                let frames = framer.tool_call(ToolInvocation {
                    call_id: &call_id,
                    tool_name,
                    arguments,
                    chunk_size: effective_chunk_size(arguments, command.chunk_size),
                    first,
                    terminal: is_last,
                });
                first = false;
                if !emitter.emit(frames).await {
                    return emitter.disconnected(provider);
                }
            }
        }
    }

    if !emitter.emit(framer.close()).await {
        return emitter.disconnected(provider);
    }

    StreamOutcome::Completed {
        frames: emitter.frames,
    }
}
