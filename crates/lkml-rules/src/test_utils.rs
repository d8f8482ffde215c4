//! Shared test utilities for lkml-rules

use lkml_core::{Document, Violation};
use lkml_model::{build_project, Entity, Field, ProjectModel};
use lkml_parser::parse_document;

/// Parse one file, panicking on syntax errors.
pub(crate) fn doc(path: &str, source: &str) -> Document {
    parse_document(path, source).unwrap()
}

/// Build a model from `(path, source)` pairs, ignoring resolution findings.
pub(crate) fn model(files: &[(&str, &str)]) -> ProjectModel {
    let documents = files.iter().map(|(p, s)| doc(p, s)).collect();
    build_project(documents).model
}

/// Build a model from a single view file.
pub(crate) fn view_model(source: &str) -> ProjectModel {
    model(&[("test.view.lkml", source)])
}

/// Field `name` of view `view`, together with its owning entity.
pub(crate) fn field<'a>(model: &'a ProjectModel, view: &str, name: &str) -> (&'a Entity, &'a Field) {
    let entity = model.view(view).unwrap();
    (entity, entity.field(name).unwrap())
}

/// Rule ids of a batch of violations, in order.
pub(crate) fn rule_ids(violations: &[Violation]) -> Vec<&str> {
    violations.iter().map(|v| v.rule_id.as_str()).collect()
}
