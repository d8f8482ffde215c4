//! lkml-model - Project model for lkml-lint
//!
//! Merges the parsed documents of a project into one [`ProjectModel`]:
//! views and explores indexed by name, refinements applied, extends chains
//! resolved and every `${...}` reference checked. Problems found on the way
//! are returned as violations next to the model.

pub mod builder;
pub mod entity;
pub mod error;
pub mod project;
pub mod references;

pub use builder::{build_project, BuildOutcome, MAX_EXTENDS_DEPTH};
pub use entity::{Entity, EntityKey, EntityKind, Field, Join, Resolution};
pub use error::{ResolutionError, ResolutionResult};
pub use project::{EntityId, ProjectModel};
pub use references::{extract_references, substitute_references, Reference};
