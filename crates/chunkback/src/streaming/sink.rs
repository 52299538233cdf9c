// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Destinations for encoded frames

use std::convert::Infallible;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::mpsc;

/// Ordered, write-only frame transport
#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Write one frame. Returns `false` once the transport is closed.
    async fn send(&mut self, frame: String) -> bool;

    /// Resolves when the transport has been closed by the reader.
    async fn closed(&self);
}

/// Feeds an HTTP response body through a bounded channel.
pub struct ChannelSink {
    tx: mpsc::Sender<Result<Bytes, Infallible>>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Result<Bytes, Infallible>>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn send(&mut self, frame: String) -> bool {
        self.tx.send(Ok(Bytes::from(frame))).await.is_ok()
    }

    async fn closed(&self) {
        self.tx.closed().await;
    }
}

/// Collects frames in memory. With a limit, the sink reports itself closed
/// after accepting that many frames.
#[derive(Debug, Default)]
pub struct VecSink {
    frames: Vec<String>,
    limit: Option<usize>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            frames: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<String> {
        self.frames
    }

    /// All frames joined as they would appear on the wire
    pub fn body(&self) -> String {
        self.frames.concat()
    }

    fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.frames.len() >= limit)
    }
}

#[async_trait]
impl FrameSink for VecSink {
    async fn send(&mut self, frame: String) -> bool {
        if self.is_full() {
            return false;
        }
        self.frames.push(frame);
        true
    }

    async fn closed(&self) {
        if !self.is_full() {
            std::future::pending::<()>().await;
        }
    }
}
