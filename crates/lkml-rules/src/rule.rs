//! Rule contract: three scopes, one trait each.
//!
//! Rules are stateless and `Send + Sync`; the engine runs every
//! rule × instance pair on its own blocking task, so a rule never sees
//! more than the one field, file or model it is asked about.

use lkml_core::{Document, RuleId, Severity, SourceLocation, Violation};
use lkml_model::{Entity, Field, ProjectModel};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Checks one field of one view at a time.
pub trait FieldRule: Send + Sync {
    /// Stable rule id used in configuration and output
    fn id(&self) -> &'static str;
    /// One-line description shown by `lkml-lint rules`
    fn description(&self) -> &'static str;
    fn default_severity(&self) -> Severity;
    /// Check a field; `entity` is the view that owns it after resolution.
    fn check(&self, field: &Field, entity: &Entity) -> Vec<Violation>;
}

/// Checks one parsed file at a time.
pub trait FileRule: Send + Sync {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn default_severity(&self) -> Severity;
    fn check(&self, document: &Document) -> Vec<Violation>;
}

/// Checks the whole resolved project once.
pub trait ProjectRule: Send + Sync {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn default_severity(&self) -> Severity;
    fn check(&self, model: &ProjectModel) -> Vec<Violation>;
}

/// Granularity a rule runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    Field,
    File,
    Project,
}

impl fmt::Display for RuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleScope::Field => write!(f, "field"),
            RuleScope::File => write!(f, "file"),
            RuleScope::Project => write!(f, "project"),
        }
    }
}

/// A registered rule of any scope.
#[derive(Clone)]
pub enum Rule {
    Field(Arc<dyn FieldRule>),
    File(Arc<dyn FileRule>),
    Project(Arc<dyn ProjectRule>),
}

impl Rule {
    pub fn field(rule: impl FieldRule + 'static) -> Self {
        Rule::Field(Arc::new(rule))
    }

    pub fn file(rule: impl FileRule + 'static) -> Self {
        Rule::File(Arc::new(rule))
    }

    pub fn project(rule: impl ProjectRule + 'static) -> Self {
        Rule::Project(Arc::new(rule))
    }

    pub fn id(&self) -> &'static str {
        match self {
            Rule::Field(r) => r.id(),
            Rule::File(r) => r.id(),
            Rule::Project(r) => r.id(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rule::Field(r) => r.description(),
            Rule::File(r) => r.description(),
            Rule::Project(r) => r.description(),
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Rule::Field(r) => r.default_severity(),
            Rule::File(r) => r.default_severity(),
            Rule::Project(r) => r.default_severity(),
        }
    }

    pub fn scope(&self) -> RuleScope {
        match self {
            Rule::Field(_) => RuleScope::Field,
            Rule::File(_) => RuleScope::File,
            Rule::Project(_) => RuleScope::Project,
        }
    }

    /// Summary for listings.
    pub fn info(&self) -> RuleInfo {
        RuleInfo {
            id: self.id(),
            scope: self.scope(),
            severity: self.default_severity(),
            description: self.description(),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id())
            .field("scope", &self.scope())
            .finish()
    }
}

/// What `lkml-lint rules` prints for each rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    pub id: &'static str,
    pub scope: RuleScope,
    pub severity: Severity,
    pub description: &'static str,
}

/// Lint finding about a field.
pub(crate) fn field_violation(
    rule: &dyn FieldRule,
    field: &Field,
    message: impl Into<String>,
) -> Violation {
    Violation::new(
        &RuleId::new(rule.id()),
        rule.default_severity(),
        message,
        &field.location,
    )
    .with_entity(field.qualified_name())
}

/// Lint finding at a location inside a file.
pub(crate) fn file_violation(
    rule: &dyn FileRule,
    location: &SourceLocation,
    message: impl Into<String>,
) -> Violation {
    Violation::new(
        &RuleId::new(rule.id()),
        rule.default_severity(),
        message,
        location,
    )
}

/// Lint finding about a resolved entity.
pub(crate) fn entity_violation(
    rule: &dyn ProjectRule,
    entity: &Entity,
    message: impl Into<String>,
) -> Violation {
    Violation::new(
        &RuleId::new(rule.id()),
        rule.default_severity(),
        message,
        &entity.location,
    )
    .with_entity(entity.qualified_name())
}
