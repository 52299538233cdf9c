// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Chunkback: a mock LLM server driven by CBPL scripts
//!
//! The last user message of a request is parsed as a CBPL script and replayed
//! as a stream in the wire format of the endpoint that received it.

pub mod chunking;
pub mod config;
pub mod error;
pub mod server;
pub mod streaming;
pub mod tool_cache;

pub use config::ChunkbackConfig;
pub use error::{Error, Result};
pub use server::{build_router, AppState, Server};
pub use streaming::{stream_commands, Provider, StreamContext, StreamOutcome};
pub use tool_cache::{InMemoryToolCache, MockedToolResponse, ToolResponseCache};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
