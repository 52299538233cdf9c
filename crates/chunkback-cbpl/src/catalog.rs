// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Command catalog for CBPL directives
//!
//! The catalog is the authoritative list of directive names, their parameters
//! and the numeric bounds applied to them. It mirrors `cbpl.definitions.json`
//! at the crate root; the unit tests below fail if the two drift apart.

use serde::Serialize;

use crate::token::Keyword;

/// Version of the definition file this table was written against.
pub const CATALOG_VERSION: &str = "1.1.0";

/// Operand type accepted by a directive parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
}

/// A single directive parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    /// Inclusive lower bound for numeric parameters
    pub min: Option<u64>,
    /// Inclusive upper bound for numeric parameters
    pub max: Option<u64>,
}

impl ParamSpec {
    const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::String,
            min: None,
            max: None,
        }
    }

    const fn number(name: &'static str, min: u64, max: u64) -> Self {
        Self {
            name,
            kind: ParamKind::Number,
            min: Some(min),
            max: Some(max),
        }
    }

    /// Clamp a numeric operand into this parameter's bounds.
    pub fn clamp(&self, value: u64) -> u64 {
        let value = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(value, |max| value.min(max))
    }

    /// Whether a numeric operand lies inside this parameter's bounds.
    pub fn accepts(&self, value: u64) -> bool {
        self.clamp(value) == value
    }
}

/// Catalog entry for one directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub keyword: Keyword,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl CommandSpec {
    pub fn name(&self) -> &'static str {
        self.keyword.name()
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|param| param.name == name)
    }
}

/// Every directive recognised by the lexer, in definition order.
pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        keyword: Keyword::Say,
        description: "Outputs text content as a streaming response",
        params: &[ParamSpec::string("content")],
    },
    CommandSpec {
        keyword: Keyword::ToolCall,
        description: "Invokes a tool/function with specified arguments",
        params: &[ParamSpec::string("toolName"), ParamSpec::string("arguments")],
    },
    CommandSpec {
        keyword: Keyword::ChunkSize,
        description: "Sets the chunk size for subsequent SAY statements",
        params: &[ParamSpec::number("size", 1, 1000)],
    },
    CommandSpec {
        keyword: Keyword::ChunkLatency,
        description: "Sets the delay in milliseconds between chunks",
        params: &[ParamSpec::number("latency", 0, 10_000)],
    },
    CommandSpec {
        keyword: Keyword::RandomLatency,
        description: "Sets a random delay range in milliseconds between chunks",
        params: &[
            ParamSpec::number("min", 0, 10_000),
            ParamSpec::number("max", 0, 10_000),
        ],
    },
];

/// Catalog entry for a keyword.
///
/// `COMMANDS` is ordered like the `Keyword` discriminants.
pub fn command(keyword: Keyword) -> &'static CommandSpec {
    &COMMANDS[keyword as usize]
}

/// Case-insensitive lookup of a directive by name.
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name().eq_ignore_ascii_case(name))
}
