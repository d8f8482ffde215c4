//! Project rules: checks that need the resolved model.

use crate::rule::{entity_violation, ProjectRule};
use lkml_core::{BlockKind, Severity, Violation};
use lkml_model::{Entity, ProjectModel};
use std::collections::BTreeSet;

/// Views with measures need exactly one primary key for symmetric
/// aggregates to work.
pub struct PrimaryKeyRule;

impl PrimaryKeyRule {
    fn check_view(&self, view: &Entity) -> Option<Violation> {
        if view.extension_required || view.is_derived_table() {
            return None;
        }
        if !view.fields.iter().any(|f| f.kind == BlockKind::Measure) {
            return None;
        }
        let keys: Vec<&str> = view
            .fields
            .iter()
            .filter(|f| f.is_primary_key())
            .map(|f| f.name.as_str())
            .collect();
        let message = match keys.as_slice() {
            [_] => return None,
            [] => format!("view '{}' has measures but no primary key", view.name()),
            many => format!(
                "view '{}' declares {} primary keys: {}",
                view.name(),
                many.len(),
                many.join(", ")
            ),
        };
        let mut violation = entity_violation(self, view, message);
        for key in keys {
            if let Some(field) = view.field(key) {
                violation = violation.with_related(field.location.clone());
            }
        }
        Some(violation)
    }
}

impl ProjectRule for PrimaryKeyRule {
    fn id(&self) -> &'static str {
        "primary_key"
    }

    fn description(&self) -> &'static str {
        "Views with measures declare exactly one primary key"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, model: &ProjectModel) -> Vec<Violation> {
        model
            .views()
            .filter_map(|view| self.check_view(view))
            .collect()
    }
}

/// Views nobody can query.
pub struct NoOrphansRule;

impl ProjectRule for NoOrphansRule {
    fn id(&self) -> &'static str {
        "no_orphans"
    }

    fn description(&self) -> &'static str {
        "Every view is used by an explore, a join or an extends"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, model: &ProjectModel) -> Vec<Violation> {
        let mut used: BTreeSet<&str> = BTreeSet::new();
        for explore in model.explores() {
            used.insert(explore.base_view_name());
            used.extend(explore.joins.iter().map(|j| j.target_view()));
        }
        for entity in model.entities() {
            used.extend(entity.extends.iter().map(|base| base.as_str()));
        }
        log::debug!("{} views referenced by explores, joins or extends", used.len());

        model
            .views()
            .filter(|view| !used.contains(view.name()))
            .map(|view| {
                entity_violation(
                    self,
                    view,
                    format!(
                        "view '{}' is not used by any explore, join or extends",
                        view.name()
                    ),
                )
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
