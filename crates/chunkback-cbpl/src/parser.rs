// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Recursive-descent parser for CBPL
//!
//! Statements are one keyword followed by its operands. Configuration
//! statements (`CHUNKSIZE`, `CHUNKLATENCY`, `RANDOMLATENCY`) do not produce
//! output; they update the ambient configuration that every later `SAY` and
//! `TOOLCALL` snapshots.
//!
//! Recovery rules:
//! - a token that cannot start a statement is skipped;
//! - an `Invalid` token in operand position abandons the current statement
//!   without consuming the invalid token, and scanning resumes from there;
//! - any other missing or wrong-kind operand is a hard [`ParseError`].

use tracing::{debug, warn};

use crate::catalog::{self, ParamKind};
use crate::command::{Directive, ExecutableCommand, Statement};
use crate::error::{ParseError, Result};
use crate::lexer::tokenize;
use crate::token::{Keyword, Token, TokenKind};

/// Lex and parse a script in one step.
pub fn parse_script(input: &str) -> Result<Vec<ExecutableCommand>> {
    parse(&tokenize(input))
}

/// Parse a token sequence into executable commands.
pub fn parse(tokens: &[Token]) -> Result<Vec<ExecutableCommand>> {
    Parser::new(tokens).parse()
}

/// Configuration that scope-setting statements accumulate
#[derive(Debug, Default, Clone, Copy)]
struct Ambient {
    chunk_size: Option<usize>,
    chunk_latency_ms: Option<u64>,
    random_latency_ms: Option<(u64, u64)>,
}

impl Ambient {
    fn apply(&mut self, statement: Statement) -> Option<ExecutableCommand> {
        let directive = match statement {
            Statement::Say { content } => Directive::Say { content },
            Statement::ToolCall {
                tool_name,
                arguments,
            } => Directive::ToolCall {
                tool_name,
                arguments,
            },
            Statement::ChunkSize { size } => {
                self.chunk_size = (size > 0).then_some(size);
                return None;
            }
            Statement::ChunkLatency { latency_ms } => {
                self.chunk_latency_ms = Some(latency_ms);
                return None;
            }
            Statement::RandomLatency { min_ms, max_ms } => {
                self.random_latency_ms = Some((min_ms, max_ms));
                return None;
            }
        };

        Some(ExecutableCommand {
            directive,
            chunk_size: self.chunk_size,
            chunk_latency_ms: self.chunk_latency_ms,
            random_latency_ms: self.random_latency_ms,
        })
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    current: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, current: 0 }
    }

    fn parse(mut self) -> Result<Vec<ExecutableCommand>> {
        let mut commands = Vec::new();
        let mut ambient = Ambient::default();

        loop {
            let Some(token) = self.peek() else { break };
            match &token.kind {
                TokenKind::End => break,
                TokenKind::Newline => {
                    self.advance();
                    continue;
                }
                TokenKind::Keyword(keyword) => {
                    let keyword = *keyword;
                    if let Some(statement) = self.statement(keyword)? {
                        commands.extend(ambient.apply(statement));
                    }
                }
                other => {
                    debug!(
                        line = token.line,
                        column = token.column,
                        "Skipping {}",
                        other.describe()
                    );
                    self.advance();
                }
            }

            if self.check_newline() {
                self.advance();
            }
        }

        Ok(commands)
    }

    /// Parse one statement. `Ok(None)` means the statement was abandoned.
    fn statement(&mut self, keyword: Keyword) -> Result<Option<Statement>> {
        let keyword_token = self.advance();
        let (line, column) = keyword_token.map_or((0, 0), |token| (token.line, token.column));

        let statement = match keyword {
            Keyword::Say => {
                let Some(content) = self.expect_string("Expected string after SAY")? else {
                    return Ok(self.abandon(keyword, line, column));
                };
                Statement::Say { content }
            }
            Keyword::ToolCall => {
                let Some(tool_name) = self.expect_string("Expected tool name string")? else {
                    return Ok(self.abandon(keyword, line, column));
                };
                let Some(arguments) = self.expect_string("Expected arguments string")? else {
                    return Ok(self.abandon(keyword, line, column));
                };
                Statement::ToolCall {
                    tool_name,
                    arguments,
                }
            }
            Keyword::ChunkSize => {
                let Some(raw) = self.expect_raw_number(keyword)? else {
                    return Ok(self.abandon(keyword, line, column));
                };
                // Zero restores the whole-content default instead of clamping up.
                let size = if raw == 0 {
                    0
                } else {
                    self.clamp_operand(keyword, "size", raw)
                };
                Statement::ChunkSize {
                    size: usize::try_from(size).unwrap_or(usize::MAX),
                }
            }
            Keyword::ChunkLatency => {
                let Some(latency_ms) = self.expect_number(keyword, "latency")? else {
                    return Ok(self.abandon(keyword, line, column));
                };
                Statement::ChunkLatency { latency_ms }
            }
            Keyword::RandomLatency => {
                let Some(min_ms) = self.expect_number(keyword, "min")? else {
                    return Ok(self.abandon(keyword, line, column));
                };
                let Some(max_ms) = self.expect_number(keyword, "max")? else {
                    return Ok(self.abandon(keyword, line, column));
                };
                let (min_ms, max_ms) = if min_ms <= max_ms {
                    (min_ms, max_ms)
                } else {
                    (max_ms, min_ms)
                };
                Statement::RandomLatency { min_ms, max_ms }
            }
        };

        Ok(Some(statement))
    }

    fn abandon(&self, keyword: Keyword, line: usize, column: usize) -> Option<Statement> {
        debug!(line, column, "Abandoning {keyword} statement at invalid operand");
        None
    }

    fn expect_string(&mut self, message: &str) -> Result<Option<String>> {
        match self.expect_operand(ParamKind::String, message)? {
            Some(TokenKind::String(value)) => Ok(Some(value.clone())),
            _ => Ok(None),
        }
    }

    /// Expect a number and clamp it into the catalog bounds of `param`.
    fn expect_number(&mut self, keyword: Keyword, param: &str) -> Result<Option<u64>> {
        Ok(self
            .expect_raw_number(keyword)?
            .map(|value| self.clamp_operand(keyword, param, value)))
    }

    fn expect_raw_number(&mut self, keyword: Keyword) -> Result<Option<u64>> {
        let message = format!("Expected number after {keyword}");
        match self.expect_operand(ParamKind::Number, &message)? {
            Some(TokenKind::Number(value)) => Ok(Some(*value)),
            _ => Ok(None),
        }
    }

    fn clamp_operand(&self, keyword: Keyword, param: &str, value: u64) -> u64 {
        let Some(spec) = catalog::command(keyword).param(param) else {
            return value;
        };
        let clamped = spec.clamp(value);
        if clamped != value {
            warn!(
                directive = %keyword,
                param,
                value,
                clamped,
                "Operand outside catalog bounds, clamping"
            );
        }
        clamped
    }

    /// Consume an operand of the given kind. An invalid token yields `None`
    /// and is left in place.
    fn expect_operand(&mut self, kind: ParamKind, message: &str) -> Result<Option<&'t TokenKind>> {
        let Some(token) = self.peek() else {
            return Err(ParseError::new(0, 0, message));
        };

        match (&token.kind, kind) {
            (TokenKind::Invalid(_), _) => Ok(None),
            (found @ TokenKind::String(_), ParamKind::String)
            | (found @ TokenKind::Number(_), ParamKind::Number) => {
                self.advance();
                Ok(Some(found))
            }
            _ => Err(ParseError::new(token.line, token.column, message)),
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.current)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.current);
        if token.is_some_and(|token| !token.is_end()) {
            self.current += 1;
        }
        token
    }

    fn check_newline(&self) -> bool {
        matches!(self.peek().map(|token| &token.kind), Some(TokenKind::Newline))
    }
}
