// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Token types produced by the CBPL lexer

use serde::Serialize;

use crate::catalog;

/// Directive keywords, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    Say = 0,
    ToolCall = 1,
    ChunkSize = 2,
    ChunkLatency = 3,
    RandomLatency = 4,
}

impl Keyword {
    pub const ALL: [Keyword; 5] = [
        Keyword::Say,
        Keyword::ToolCall,
        Keyword::ChunkSize,
        Keyword::ChunkLatency,
        Keyword::RandomLatency,
    ];

    /// Canonical upper-case spelling
    pub fn name(self) -> &'static str {
        match self {
            Keyword::Say => "SAY",
            Keyword::ToolCall => "TOOLCALL",
            Keyword::ChunkSize => "CHUNKSIZE",
            Keyword::ChunkLatency => "CHUNKLATENCY",
            Keyword::RandomLatency => "RANDOMLATENCY",
        }
    }

    /// Resolve an identifier through the command catalog (case-insensitive).
    pub fn lookup(word: &str) -> Option<Self> {
        catalog::lookup(word).map(|spec| spec.keyword)
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Token kind together with its decoded literal value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    /// String literal with escapes already resolved
    String(String),
    /// Non-negative integer literal
    Number(u64),
    Newline,
    End,
    /// Unknown identifier (upper-cased) or a single unexpected character
    Invalid(String),
}

impl TokenKind {
    /// Short description used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Keyword(keyword) => format!("keyword {keyword}"),
            TokenKind::String(_) => "string".to_string(),
            TokenKind::Number(value) => format!("number {value}"),
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::End => "end of input".to_string(),
            TokenKind::Invalid(text) => format!("invalid token '{text}'"),
        }
    }
}

/// A token with its 1-based source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }

    pub fn is_end(&self) -> bool {
        matches!(self.kind, TokenKind::End)
    }
}
