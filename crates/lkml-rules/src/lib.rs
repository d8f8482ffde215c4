//! lkml-rules - Rule engine for lkml-lint
//!
//! This crate defines the rule contract (one trait per scope), the
//! registry of built-in rules, the concurrent [`RuleEngine`] that isolates
//! faulting rules, and the [`lint`] pipeline tying parser, model builder
//! and engine together.

pub mod builtin;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod rule;
pub mod severity;

#[cfg(test)]
pub(crate) mod test_utils;

pub use engine::{EngineOptions, RuleEngine, DEFAULT_TIMEOUT, PROJECT_PATH};
pub use error::{RuleFault, RulesError, RulesResult};
pub use pipeline::{lint, parse_documents, LintReport, SourceText};
pub use registry::RuleRegistry;
pub use rule::{FieldRule, FileRule, ProjectRule, Rule, RuleInfo, RuleScope};
pub use severity::{apply_severity_overrides, OverriddenSeverity, SeverityOverrides};
