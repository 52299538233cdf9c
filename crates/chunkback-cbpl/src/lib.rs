// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Chunkback Prompt Language (CBPL)
//!
//! CBPL is the tiny scripting language clients put in the last user message
//! to tell the mock server exactly what to stream back. A script is lexed
//! into [`Token`]s and parsed into [`ExecutableCommand`]s, each carrying the
//! chunking configuration that was in effect where it appeared.
//!
//! ```
//! use chunkback_cbpl::{parse_script, Directive};
//!
//! let commands = parse_script("CHUNKSIZE 5\nSAY \"Hello world\"").unwrap();
//! assert_eq!(commands.len(), 1);
//! assert_eq!(commands[0].chunk_size, Some(5));
//! assert!(matches!(commands[0].directive, Directive::Say { .. }));
//! ```

pub mod catalog;
pub mod command;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use catalog::{CommandSpec, ParamKind, ParamSpec, COMMANDS};
pub use command::{Directive, ExecutableCommand, Statement};
pub use error::{ParseError, Result};
pub use lexer::{tokenize, Lexer};
pub use parser::{parse, parse_script};
pub use token::{Keyword, Token, TokenKind};
