//! Web IDL processing API
//!
//! Pure functions for turning IDL source text into a serialized document.
//! This module contains no I/O operations, CLI handling, or process exits;
//! every function takes structured input and returns structured output for
//! easy testing, following the same separation the CLI driver relies on.

use std::fmt;

use crate::ast::Document;
use crate::error::Error as ParseError;
use crate::{parser, serializer};

#[derive(Debug, Clone)]
pub struct ProcessArgs {
    pub content: String,
    pub source_path: String,
    pub pretty: bool,
}

#[derive(Debug)]
pub enum ProcessError {
    Parse(ParseError),
    Serialization(String),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Parse(err) => write!(f, "Parse error: {}", err),
            ProcessError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ProcessError {}

impl From<ParseError> for ProcessError {
    fn from(err: ParseError) -> Self {
        ProcessError::Parse(err)
    }
}

/// Parses `source` into a [`Document`], per §6.1. No I/O, no diagnostics:
/// callers that need the `file:line:col: error: message` channel of §6.4
/// should pair a returned error with [`crate::error::format_diagnostic`]
/// and the caller's own filename.
pub fn parse_source(source: &str) -> Result<Document, ParseError> {
    parser::parse(source)
}

/// Parses and serializes `args.content` to a JSON string in one step
/// (§6.1, §6.2). This is the function the CLI driver calls for each input
/// file.
pub fn parse_and_serialize(args: ProcessArgs) -> Result<String, ProcessError> {
    let document = parse_source(&args.content)?;
    let tree = serializer::serialize(&document);
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&tree)
    } else {
        serde_json::to_string(&tree)
    };
    rendered.map_err(|e| ProcessError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_serialize_round_trip() {
        let args = ProcessArgs {
            content: "interface Foo;".to_string(),
            source_path: "foo.idl".to_string(),
            pretty: false,
        };
        let output = parse_and_serialize(args).unwrap();
        assert!(output.contains("\"Foo\""));
        assert!(output.contains("\"definitions\""));
    }

    #[test]
    fn parse_error_is_reported() {
        let args = ProcessArgs {
            content: "interface ;".to_string(),
            source_path: "foo.idl".to_string(),
            pretty: false,
        };
        assert!(parse_and_serialize(args).is_err());
    }
}
