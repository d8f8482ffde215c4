//! Error types for lkml-model
//!
//! Resolution problems never abort a build. Each one is converted into a
//! violation with origin `resolution` and the build carries on with a
//! degraded model.

use lkml_core::{RuleId, Severity, SourceLocation, Violation, ViolationOrigin};
use thiserror::Error;

/// Problems found while merging documents into one project model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// R001: Two non-refinement definitions of the same entity
    #[error("[R001] {entity} is already defined at {first}")]
    DuplicateEntity {
        entity: String,
        location: SourceLocation,
        first: SourceLocation,
    },

    /// R002: Extends chain loops back on itself
    #[error("[R002] extends cycle: {cycle}")]
    ExtendsCycle {
        entity: String,
        cycle: String,
        location: SourceLocation,
    },

    /// R003: Extends chain longer than the walk allows
    #[error("[R003] extends chain of {entity} exceeds maximum depth of {max_depth}")]
    ExtendsTooDeep {
        entity: String,
        max_depth: usize,
        location: SourceLocation,
    },

    /// R004: Base named in `extends` does not exist
    #[error("[R004] {entity} extends unknown {kind} '{base}'")]
    ExtendsNotFound {
        entity: String,
        kind: String,
        base: String,
        location: SourceLocation,
    },

    /// R005: A name used somewhere does not resolve to anything
    #[error("[R005] {entity}: {reference} {reason}")]
    UnresolvedReference {
        entity: String,
        reference: String,
        reason: String,
        location: SourceLocation,
    },

    /// R006: Two fields with the same name in one block
    #[error("[R006] field '{field}' is already defined in {entity} at {first}")]
    DuplicateField {
        entity: String,
        field: String,
        location: SourceLocation,
        first: SourceLocation,
    },
}

impl ResolutionError {
    /// Rule id the violation is reported under.
    pub fn rule_id(&self) -> &'static str {
        match self {
            ResolutionError::DuplicateEntity { .. } => "duplicate_entity",
            ResolutionError::ExtendsCycle { .. } | ResolutionError::ExtendsTooDeep { .. } => {
                "extends_cycle"
            }
            ResolutionError::ExtendsNotFound { .. } => "extends_not_found",
            ResolutionError::UnresolvedReference { .. } => "unresolved_reference",
            ResolutionError::DuplicateField { .. } => "duplicate_field",
        }
    }

    /// Where the problem is reported.
    pub fn location(&self) -> &SourceLocation {
        match self {
            ResolutionError::DuplicateEntity { location, .. }
            | ResolutionError::ExtendsCycle { location, .. }
            | ResolutionError::ExtendsTooDeep { location, .. }
            | ResolutionError::ExtendsNotFound { location, .. }
            | ResolutionError::UnresolvedReference { location, .. }
            | ResolutionError::DuplicateField { location, .. } => location,
        }
    }

    /// Qualified name of the entity (or field) involved.
    pub fn entity(&self) -> String {
        match self {
            ResolutionError::DuplicateField { entity, field, .. } => format!("{entity}.{field}"),
            ResolutionError::DuplicateEntity { entity, .. }
            | ResolutionError::ExtendsCycle { entity, .. }
            | ResolutionError::ExtendsTooDeep { entity, .. }
            | ResolutionError::ExtendsNotFound { entity, .. }
            | ResolutionError::UnresolvedReference { entity, .. } => entity.clone(),
        }
    }

    /// Convert into an engine diagnostic for the violation stream.
    pub fn to_violation(&self) -> Violation {
        let violation = Violation::new(
            &RuleId::new(self.rule_id()),
            Severity::Error,
            self.to_string(),
            self.location(),
        )
        .with_origin(ViolationOrigin::Resolution)
        .with_entity(self.entity());

        match self {
            ResolutionError::DuplicateEntity { first, .. }
            | ResolutionError::DuplicateField { first, .. } => violation.with_related(first.clone()),
            _ => violation,
        }
    }
}

/// Result type alias for ResolutionError
pub type ResolutionResult<T> = Result<T, ResolutionError>;
