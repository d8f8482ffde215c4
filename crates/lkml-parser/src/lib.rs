//! lkml-parser - LookML parsing layer for lkml-lint
//!
//! This crate turns the raw text of one file into a typed
//! [`lkml_core::Document`]. Parsing is pure and per-file, so callers may
//! parse many files concurrently.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ParseError, ParseResult, PARSE_ERROR_RULE};
pub use lexer::{is_expression_key, tokenize, Token, TokenKind};
pub use parser::{parse_document, MAX_NESTING};
