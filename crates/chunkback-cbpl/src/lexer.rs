// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! CBPL lexer
//!
//! A single left-to-right scan over the script. The lexer never fails:
//! anything it cannot classify becomes an `Invalid` token and the parser
//! decides what to do with it. The output always ends with one `End` token.

use std::iter::Peekable;
use std::str::Chars;

use crate::token::{Keyword, Token, TokenKind};

/// Tokenize a whole script.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

/// Character scanner tracking 1-based line/column positions
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(&current) = self.chars.peek() {
            match current {
                '\n' => {
                    tokens.push(Token::new(TokenKind::Newline, self.line, self.column));
                    self.advance();
                }
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '"' => tokens.push(self.read_string()),
                c if c.is_ascii_digit() => tokens.push(self.read_number()),
                c if c.is_ascii_alphabetic() => tokens.push(self.read_word()),
                other => {
                    tokens.push(Token::new(
                        TokenKind::Invalid(other.to_string()),
                        self.line,
                        self.column,
                    ));
                    self.advance();
                }
            }
        }

        tokens.push(Token::new(TokenKind::End, self.line, self.column));
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let current = self.chars.next()?;
        if current == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(current)
    }

    /// Read a double-quoted string. An unterminated string yields whatever
    /// was accumulated before the end of input.
    fn read_string(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut value = String::new();

        // opening quote
        self.advance();

        while let Some(current) = self.advance() {
            match current {
                '"' => break,
                '\\' => match self.chars.peek().copied() {
                    Some(escaped @ ('"' | 'n' | 't' | '\\')) => {
                        self.advance();
                        value.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            other => other,
                        });
                    }
                    // Unknown escapes pass through untouched.
                    _ => value.push('\\'),
                },
                other => value.push(other),
            }
        }

        Token::new(TokenKind::String(value), line, column)
    }

    fn read_number(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut value: u64 = 0;

        while let Some(digit) = self.chars.peek().and_then(|c| c.to_digit(10)) {
            value = value.saturating_mul(10).saturating_add(u64::from(digit));
            self.advance();
        }

        Token::new(TokenKind::Number(value), line, column)
    }

    fn read_word(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut word = String::new();

        while let Some(&current) = self.chars.peek() {
            if !current.is_ascii_alphanumeric() {
                break;
            }
            word.push(current.to_ascii_uppercase());
            self.advance();
        }

        let kind = match Keyword::lookup(&word) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Invalid(word),
        };
        Token::new(kind, line, column)
    }
}
