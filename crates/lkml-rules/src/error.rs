//! Error types for lkml-rules

use lkml_core::{RuleId, Severity, SourceLocation, Violation, ViolationOrigin};
use std::time::Duration;
use thiserror::Error;

/// Errors setting up the rule registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// L001: Configuration names a rule that does not exist
    #[error("[L001] Unknown rule '{id}'. Known rules: {known}")]
    UnknownRule { id: String, known: String },

    /// L002: Two rules registered under one id
    #[error("[L002] Rule '{id}' is already registered")]
    DuplicateRule { id: String },

    /// L003: A rule option could not be used
    #[error("[L003] Invalid option for rule '{rule}': {message}")]
    InvalidOption { rule: String, message: String },
}

/// Result type alias for RulesError
pub type RulesResult<T> = Result<T, RulesError>;

/// A rule instance that did not finish.
///
/// Faults are contained: the instance yields this single diagnostic and
/// every other instance keeps running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleFault {
    /// F001: The rule panicked
    #[error("[F001] rule '{rule}' panicked on {instance}: {message}")]
    Panicked {
        rule: String,
        instance: String,
        message: String,
    },

    /// F002: The rule ran past its time budget
    #[error("[F002] rule '{rule}' timed out after {}s on {instance}", timeout.as_secs_f64())]
    TimedOut {
        rule: String,
        instance: String,
        timeout: Duration,
    },
}

impl RuleFault {
    pub fn rule(&self) -> &str {
        match self {
            RuleFault::Panicked { rule, .. } | RuleFault::TimedOut { rule, .. } => rule,
        }
    }

    pub fn instance(&self) -> &str {
        match self {
            RuleFault::Panicked { instance, .. } | RuleFault::TimedOut { instance, .. } => instance,
        }
    }

    /// Convert into an engine diagnostic carrying the faulting rule's id.
    ///
    /// The instance is named in the message; callers attach an entity only
    /// when the instance is one.
    pub fn to_violation(&self, location: &SourceLocation) -> Violation {
        Violation::new(
            &RuleId::new(self.rule()),
            Severity::Error,
            self.to_string(),
            location,
        )
        .with_origin(ViolationOrigin::RuleFault)
    }
}
