//! Error types for lkml-parser

use lkml_core::{RuleId, Severity, SourceLocation, Violation, ViolationOrigin};
use thiserror::Error;

/// Rule id under which parse failures are reported.
pub const PARSE_ERROR_RULE: &str = "parse_error";

/// LookML parse errors.
///
/// Parsing stops at the first error: nothing after it in the file can be
/// trusted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unexpected token (P001)
    #[error("[P001] {path}:{line}:{column}: expected {expected}, found {found}")]
    Unexpected {
        path: String,
        line: u32,
        column: u32,
        expected: String,
        found: String,
    },

    /// String literal without closing quote (P002)
    #[error("[P002] {path}:{line}:{column}: unterminated string literal")]
    UnterminatedString { path: String, line: u32, column: u32 },

    /// Expression block without `;;` (P003)
    #[error("[P003] {path}:{line}:{column}: value of '{key}' is not terminated by ';;'")]
    UnterminatedExpression {
        path: String,
        line: u32,
        column: u32,
        key: String,
    },

    /// Blocks or lists nested deeper than the parser follows (P004)
    #[error("[P004] {path}:{line}:{column}: nesting exceeds {max_depth} levels")]
    NestingTooDeep {
        path: String,
        line: u32,
        column: u32,
        max_depth: usize,
    },
}

impl ParseError {
    /// File the error occurred in.
    pub fn path(&self) -> &str {
        match self {
            ParseError::Unexpected { path, .. }
            | ParseError::UnterminatedString { path, .. }
            | ParseError::UnterminatedExpression { path, .. }
            | ParseError::NestingTooDeep { path, .. } => path,
        }
    }

    /// 1-based line of the error.
    pub fn line(&self) -> u32 {
        match self {
            ParseError::Unexpected { line, .. }
            | ParseError::UnterminatedString { line, .. }
            | ParseError::UnterminatedExpression { line, .. }
            | ParseError::NestingTooDeep { line, .. } => *line,
        }
    }

    /// 1-based column of the error.
    pub fn column(&self) -> u32 {
        match self {
            ParseError::Unexpected { column, .. }
            | ParseError::UnterminatedString { column, .. }
            | ParseError::UnterminatedExpression { column, .. }
            | ParseError::NestingTooDeep { column, .. } => *column,
        }
    }

    /// Error code (`P001`..`P004`).
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::Unexpected { .. } => "P001",
            ParseError::UnterminatedString { .. } => "P002",
            ParseError::UnterminatedExpression { .. } => "P003",
            ParseError::NestingTooDeep { .. } => "P004",
        }
    }

    /// Convert into an engine diagnostic for the violation stream.
    pub fn to_violation(&self) -> Violation {
        let location = SourceLocation::point(self.path(), self.line(), self.column());
        Violation::new(
            &RuleId::new(PARSE_ERROR_RULE),
            Severity::Error,
            self.to_string(),
            &location,
        )
        .with_origin(ViolationOrigin::Parse)
    }
}

/// Result type alias for ParseError
pub type ParseResult<T> = Result<T, ParseError>;
