// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration management for the Chunkback server

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default port of the mock server
pub const DEFAULT_PORT: u16 = 5653;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkbackConfig {
    pub server: ServerConfig,
    pub streaming: StreamingConfig,
    pub security: SecurityConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allow any origin
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            cors_enabled: true,
        }
    }
}

/// Stream encoding defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Pause between text chunks when a script sets no latency
    pub default_chunk_latency_ms: u64,

    /// Model name echoed back when the request does not name one
    pub default_model: String,

    /// Frames buffered between the encoder and the response body
    pub channel_capacity: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            default_chunk_latency_ms: 10,
            default_model: "echo-model".to_string(),
            channel_capacity: 64,
        }
    }
}

impl StreamingConfig {
    pub fn default_latency(&self) -> Duration {
        Duration::from_millis(self.default_chunk_latency_ms)
    }
}

/// Security configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Accepted API keys; empty disables authentication
    pub api_keys: Vec<String>,
}

impl SecurityConfig {
    pub fn auth_enabled(&self) -> bool {
        !self.api_keys.is_empty()
    }

    pub fn accepts(&self, key: &str) -> bool {
        self.api_keys.iter().any(|candidate| candidate == key)
    }
}

impl ChunkbackConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ChunkbackConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config("Server port cannot be 0"));
        }

        if self.streaming.channel_capacity == 0 {
            return Err(Error::config("Streaming channel capacity cannot be 0"));
        }

        if self.security.api_keys.iter().any(|key| key.trim().is_empty()) {
            return Err(Error::config("API keys cannot be empty"));
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|err| Error::config(format!("Invalid bind address '{addr}': {err}")))
    }
}
