//! lkml-core - Core library for lkml-lint
//!
//! This crate provides the shared data model used by every phase of a lint
//! run: the typed document tree produced by the parser, source locations,
//! violations, identifier newtypes and the YAML configuration.

pub mod config;
pub mod document;
pub mod error;
mod identifier;
pub mod location;
pub mod names;
pub mod violation;

pub use config::{ConfigSeverity, EngineConfig, LintConfig, RuleOptions};
pub use document::{Block, BlockKind, Document, Property, Value};
pub use error::{CoreError, CoreResult};
pub use location::SourceLocation;
pub use names::{EntityName, RuleId};
pub use violation::{sort_violations, Severity, Violation, ViolationOrigin};
