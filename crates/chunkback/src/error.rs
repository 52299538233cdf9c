// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the Chunkback server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chunkback_cbpl::ParseError;
use serde_json::json;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("YAML serialization error: {source}")]
    YamlSerialization {
        #[from]
        source: serde_yaml::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Parse(_) | Error::BadRequest { .. } | Error::Serialization { .. } => {
                StatusCode::BAD_REQUEST
            }
            Error::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Config { .. } | Error::YamlSerialization { .. } | Error::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Value of the `error.type` field in JSON error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Parse(_) => "parse_error",
            Error::BadRequest { .. } | Error::Serialization { .. } => "invalid_request_error",
            Error::Unauthorized { .. } => "authentication_error",
            Error::NotFound { .. } => "not_found_error",
            Error::Config { .. } | Error::YamlSerialization { .. } | Error::Io { .. } => {
                "internal_error"
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        let body = json!({
            "error": {
                "message": self.to_string(),
                "type": self.kind(),
            }
        });
        (status, Json(body)).into_response()
    }
}
