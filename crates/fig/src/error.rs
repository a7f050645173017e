//! Error types for parsing, evaluation and the config service
//!
//! Failures come in three tiers:
//!
//! 1. [`ParseError`]s are collected while parsing; parsing never stops early.
//! 2. Evaluation failures are ordinary [`Value::Error`](crate::Value::Error)
//!    values and never appear here.
//! 3. [`FatalError`]s are front-end invariant violations (or an interrupted
//!    evaluation). They abort the current evaluation.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// The kind of a lexical or syntactic error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A closing bracket does not pair with the open one.
    MismatchedBraces,
    /// An opening bracket was never closed.
    IncompleteBraces,
    /// A string literal is missing its closing quote.
    IncompleteString,
    /// A character that cannot start any token.
    InvalidCharacter,
    /// Two terms are adjacent with no operator between them.
    MissingOperator,
    /// An operator is missing one of its operands.
    MissingTerm,
    /// The expression nests deeper than the parser accepts.
    TooDeep,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ParseErrorKind::MismatchedBraces => "mismatched braces/parens",
            ParseErrorKind::IncompleteBraces => "incomplete braces/parens",
            ParseErrorKind::IncompleteString => "unterminated string",
            ParseErrorKind::InvalidCharacter => "invalid character",
            ParseErrorKind::MissingOperator => "missing operator",
            ParseErrorKind::MissingTerm => "missing term",
            ParseErrorKind::TooDeep => "expression nested too deeply",
        };
        f.write_str(text)
    }
}

/// A parse error with the byte offset where it was detected.
///
/// Serializes as the plain string `"<kind> at <offset>"`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("{kind} at {offset}")]
pub struct ParseError {
    /// What went wrong
    pub kind: ParseErrorKind,

    /// Byte offset into the source
    pub offset: usize,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// Byte offset of the error.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Serialize for ParseError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A non-empty list of parse errors.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParseErrors(pub Vec<ParseError>);

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join(", "))
    }
}

impl ParseErrors {
    /// The first error, which is the one reported to callers that only
    /// want a single reason.
    pub fn first(&self) -> Option<&ParseError> {
        self.0.first()
    }

    /// Iterate over all errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.0.iter()
    }
}

/// Unrecoverable failures.
///
/// These indicate a bug in the front-end (or a caller that evaluated a tree
/// which still carried parse errors), never bad user data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FatalError {
    /// The evaluator met a node shape the normalizer should never produce.
    #[error("malformed expression node: {found}")]
    MalformedNode {
        /// Rendering of the offending node
        found: String,
    },

    /// The left side of `=` was not a name.
    #[error("invalid assignment target at {offset}")]
    InvalidAssignTarget {
        /// Byte offset of the `=` operator
        offset: usize,
    },

    /// A `,` or `=` appeared outside an argument list or closure body.
    #[error("`{op}` is only valid inside an argument list (at {offset})")]
    MisplacedOperator {
        /// The operator text
        op: &'static str,
        /// Byte offset of the operator
        offset: usize,
    },

    /// Evaluation was interrupted through the context flag.
    #[error("evaluation interrupted")]
    Interrupted,
}

/// A name was bound twice in the same scope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("duplicate name: {0}")]
pub struct DuplicateName(pub String);

/// Errors surfaced by the config service.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No entry is stored under the key.
    #[error("config not found: {0}")]
    NotFound(String),

    /// The stored expression does not parse.
    #[error("invalid config expression: {0}")]
    Parse(#[from] ParseErrors),

    /// The front-end or evaluator hit an unrecoverable condition.
    #[error(transparent)]
    Fatal(#[from] FatalError),

    /// The expression evaluated to an error value.
    #[error("{0}")]
    Evaluation(String),

    /// The settings file could not be read or decoded.
    #[error("invalid settings: {0}")]
    Settings(String),
}

/// Result type alias for fig operations that can fail fatally
pub type Result<T> = std::result::Result<T, FatalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(ParseErrorKind::MissingTerm, 7);
        assert_eq!(err.to_string(), "missing term at 7");
        assert_eq!(err.offset(), 7);
    }

    #[test]
    fn test_parse_error_serializes_as_string() {
        let err = ParseError::new(ParseErrorKind::IncompleteString, 3);
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"unterminated string at 3\"");
    }

    #[test]
    fn test_parse_errors_serialize_as_list() {
        let errs = ParseErrors(vec![
            ParseError::new(ParseErrorKind::MismatchedBraces, 1),
            ParseError::new(ParseErrorKind::InvalidCharacter, 4),
        ]);
        let json = serde_json::to_string(&errs).unwrap();
        assert_eq!(
            json,
            r#"["mismatched braces/parens at 1","invalid character at 4"]"#
        );
        assert_eq!(
            errs.to_string(),
            "mismatched braces/parens at 1, invalid character at 4"
        );
    }

    #[test]
    fn test_fatal_error_display() {
        let err = FatalError::MisplacedOperator { op: ",", offset: 2 };
        assert_eq!(
            err.to_string(),
            "`,` is only valid inside an argument list (at 2)"
        );
    }
}
