//! Violations: the single output artifact of a lint run.

use crate::location::SourceLocation;
use crate::names::RuleId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Violation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational: no action required
    Info,
    /// Warning: potential issue worth reviewing
    Warning,
    /// Error: convention broken or model inconsistent
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Where a violation came from.
///
/// Separates lint findings from engine diagnostics about input that could
/// not be parsed, resolved or checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationOrigin {
    /// Finding reported by a rule
    Lint,
    /// File could not be parsed
    Parse,
    /// Cross-file resolution problem (conflict, extends, references)
    Resolution,
    /// A rule panicked or timed out
    RuleFault,
}

impl ViolationOrigin {
    /// Returns true for diagnostics produced by the engine itself.
    pub fn is_engine(&self) -> bool {
        !matches!(self, ViolationOrigin::Lint)
    }
}

impl std::fmt::Display for ViolationOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationOrigin::Lint => write!(f, "lint"),
            ViolationOrigin::Parse => write!(f, "parse"),
            ViolationOrigin::Resolution => write!(f, "resolution"),
            ViolationOrigin::RuleFault => write!(f, "rule_fault"),
        }
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Identifier of the rule (or engine check) that produced this
    pub rule_id: RuleId,
    pub severity: Severity,
    pub origin: ViolationOrigin,
    /// Human-readable message
    pub message: String,
    /// File the violation points at
    pub path: String,
    /// 1-based line, `None` for file-level findings
    pub line: Option<u32>,
    pub column: Option<u32>,
    /// Qualified name of the offending entity or field (`view:orders`, `orders.id`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Other locations involved, e.g. the first definition of a duplicate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<SourceLocation>,
}

impl Violation {
    /// Lint finding located at `location`.
    pub fn new(
        rule_id: &RuleId,
        severity: Severity,
        message: impl Into<String>,
        location: &SourceLocation,
    ) -> Self {
        let (line, column) = if location.line == 0 {
            (None, None)
        } else {
            (Some(location.line), Some(location.column))
        };
        Self {
            rule_id: rule_id.clone(),
            severity,
            origin: ViolationOrigin::Lint,
            message: message.into(),
            path: location.path.clone(),
            line,
            column,
            entity: None,
            related: Vec::new(),
        }
    }

    /// Lint finding about a whole file.
    pub fn for_file(
        rule_id: &RuleId,
        severity: Severity,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::new(rule_id, severity, message, &SourceLocation::file(path))
    }

    /// Attach the qualified name of the offending entity.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Attach another location involved in the finding.
    pub fn with_related(mut self, location: SourceLocation) -> Self {
        self.related.push(location);
        self
    }

    pub fn with_origin(mut self, origin: ViolationOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Copy of this violation with a different severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Returns true if this is an error-level violation.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => write!(f, "{}:{}:{}", self.path, line, col)?,
            (Some(line), None) => write!(f, "{}:{}", self.path, line)?,
            _ => write!(f, "{}", self.path)?,
        }
        write!(f, " {} [{}] {}", self.severity, self.rule_id, self.message)
    }
}

/// Sort violations into their canonical, diffable order.
///
/// Grouped by file in `path_order` (input order; unknown paths follow,
/// alphabetically), then by line with file-level findings first, then by
/// rule id. Column, entity and message break remaining ties so the order
/// never depends on how violations were collected.
pub fn sort_violations(violations: &mut [Violation], path_order: &[String]) {
    let rank: HashMap<&str, usize> = path_order
        .iter()
        .enumerate()
        .map(|(i, p)| (p.as_str(), i))
        .collect();

    violations.sort_by(|a, b| {
        let ra = rank.get(a.path.as_str()).copied().unwrap_or(usize::MAX);
        let rb = rank.get(b.path.as_str()).copied().unwrap_or(usize::MAX);
        ra.cmp(&rb)
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.line.cmp(&b.line))
            .then_with(|| a.rule_id.cmp(&b.rule_id))
            .then_with(|| a.column.cmp(&b.column))
            .then_with(|| a.entity.cmp(&b.entity))
            .then_with(|| a.message.cmp(&b.message))
            .then_with(|| compare_rest(a, b))
    });
}

fn compare_rest(a: &Violation, b: &Violation) -> Ordering {
    a.severity
        .cmp(&b.severity)
        .then_with(|| a.origin.cmp(&b.origin))
        .then_with(|| a.related.cmp(&b.related))
}

#[cfg(test)]
#[path = "violation_test.rs"]
mod tests;
