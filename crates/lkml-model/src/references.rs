//! `${...}` substitution references and the checks that resolve them.

use crate::entity::{Entity, Field};
use crate::error::{ResolutionError, ResolutionResult};
use crate::project::ProjectModel;
use lkml_core::SourceLocation;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Explore-level properties whose references are checked.
const EXPLORE_SQL_KEYS: &[&str] = &["sql_always_where", "sql_always_having"];

/// Join properties whose references are checked.
const JOIN_SQL_KEYS: &[&str] = &["sql_on", "sql_where", "sql_foreign_key"];

static REFERENCE_RE: OnceLock<Regex> = OnceLock::new();

fn reference_re() -> &'static Regex {
    REFERENCE_RE.get_or_init(|| Regex::new(r"\$\{([^}]*)\}").expect("valid regex literal"))
}

/// A `${name}` or `${scope.name}` reference found in an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// View or join alias before the dot
    pub scope: Option<&'a str>,
    pub name: &'a str,
}

impl std::fmt::Display for Reference<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.scope {
            Some(scope) => write!(f, "${{{}.{}}}", scope, self.name),
            None => write!(f, "${{{}}}", self.name),
        }
    }
}

/// Field references in `text`, in order of appearance.
///
/// `${TABLE}` and all-caps pseudo-fields (`${orders.SQL_TABLE_NAME}`) are
/// not field references and are left out, as is anything that is not a
/// plain `name` or `scope.name`.
pub fn extract_references(text: &str) -> Vec<Reference<'_>> {
    reference_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| parse_reference(m.as_str().trim()))
        .collect()
}

/// `${...}` with every substitution replaced by `replacement`.
pub fn substitute_references(text: &str, replacement: &str) -> String {
    reference_re().replace_all(text, replacement).into_owned()
}

fn parse_reference(raw: &str) -> Option<Reference<'_>> {
    let mut parts = raw.split('.');
    let first = parts.next().filter(|s| is_identifier(s))?;
    let (scope, name) = match (parts.next(), parts.next()) {
        (None, _) => (None, first),
        (Some(second), None) if is_identifier(second) => (Some(first), second),
        _ => return None,
    };
    if is_pseudo_field(name) {
        return None;
    }
    Some(Reference { scope, name })
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `TABLE`, `SQL_TABLE_NAME` and other upper-case substitutions.
fn is_pseudo_field(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase()) && !name.chars().any(|c| c.is_ascii_lowercase())
}

/// Check explore targets and every `${...}` reference of the model.
///
/// Entities marked `extension: required` are templates and are skipped.
pub(crate) fn check_references(model: &ProjectModel) -> Vec<ResolutionError> {
    let mut errors = Vec::new();
    let aliases: BTreeSet<&str> = model
        .explores()
        .flat_map(|e| {
            std::iter::once(e.base_alias()).chain(e.joins.iter().map(|j| j.name.as_str()))
        })
        .collect();

    for explore in model.explores().filter(|e| !e.extension_required) {
        check_explore(model, explore, &mut errors);
    }
    for view in model.views().filter(|v| !v.extension_required) {
        for field in &view.fields {
            check_field(model, view, field, &aliases, &mut errors);
        }
    }
    errors
}

fn check_explore(model: &ProjectModel, explore: &Entity, errors: &mut Vec<ResolutionError>) {
    let entity = explore.qualified_name();
    let mut scope: BTreeMap<&str, &str> = BTreeMap::new();

    let base = explore.base_view_name();
    if model.view(base).is_none() {
        let location = explore
            .property("from")
            .or_else(|| explore.property("view_name"))
            .map_or(&explore.location, |p| &p.location);
        errors.push(ResolutionError::UnresolvedReference {
            entity: entity.clone(),
            reference: format!("view '{base}'"),
            reason: "is not defined".to_string(),
            location: location.clone(),
        });
    }
    scope.insert(explore.base_alias(), base);

    for join in &explore.joins {
        let target = join.target_view();
        if model.view(target).is_none() {
            errors.push(ResolutionError::UnresolvedReference {
                entity: entity.clone(),
                reference: format!("join '{}' view '{}'", join.name, target),
                reason: "is not defined".to_string(),
                location: join.location.clone(),
            });
        }
        scope.insert(&join.name, target);
    }

    let explore_props = EXPLORE_SQL_KEYS
        .iter()
        .filter_map(|key| explore.property(key));
    let join_props = explore
        .joins
        .iter()
        .flat_map(|j| JOIN_SQL_KEYS.iter().filter_map(|key| j.block.property(key)));

    for prop in explore_props.chain(join_props) {
        let Some(text) = prop.value.as_str() else {
            continue;
        };
        for reference in extract_references(text) {
            // Bare `${field}` has no meaning at explore level.
            let Some(alias) = reference.scope else {
                continue;
            };
            let result = match scope.get(alias) {
                None => Err(ResolutionError::UnresolvedReference {
                    entity: entity.clone(),
                    reference: reference.to_string(),
                    reason: format!("uses alias '{alias}' which is not joined in this explore"),
                    location: prop.location.clone(),
                }),
                // Missing views are reported once, above.
                Some(view) => match model.view(view) {
                    Some(view) => resolve_in_view(view, &reference, &entity, &prop.location),
                    None => Ok(()),
                },
            };
            errors.extend(result.err());
        }
    }
}

fn check_field(
    model: &ProjectModel,
    view: &Entity,
    field: &Field,
    aliases: &BTreeSet<&str>,
    errors: &mut Vec<ResolutionError>,
) {
    let entity = field.qualified_name();
    let sql_props = field
        .block
        .properties
        .iter()
        .filter(|p| p.name == "sql" || p.name.starts_with("sql_"));

    for prop in sql_props {
        let Some(text) = prop.value.as_str() else {
            continue;
        };
        for reference in extract_references(text) {
            let result = match reference.scope {
                None => resolve_in_view(view, &reference, &entity, &prop.location),
                Some(scope) if scope == view.name() => {
                    resolve_in_view(view, &reference, &entity, &prop.location)
                }
                Some(scope) => match model.view(scope) {
                    Some(other) => resolve_in_view(other, &reference, &entity, &prop.location),
                    // A join alias: which view it stands for depends on the explore.
                    None if aliases.contains(scope) => Ok(()),
                    None => Err(ResolutionError::UnresolvedReference {
                        entity: entity.clone(),
                        reference: reference.to_string(),
                        reason: format!("names unknown view '{scope}'"),
                        location: prop.location.clone(),
                    }),
                },
            };
            errors.extend(result.err());
        }
    }
}

fn resolve_in_view(
    view: &Entity,
    reference: &Reference<'_>,
    entity: &str,
    location: &SourceLocation,
) -> ResolutionResult<()> {
    if view.resolve_field(reference.name).is_some() {
        return Ok(());
    }
    Err(ResolutionError::UnresolvedReference {
        entity: entity.to_string(),
        reference: reference.to_string(),
        reason: format!("does not match any field of view '{}'", view.name()),
        location: location.clone(),
    })
}

#[cfg(test)]
#[path = "references_test.rs"]
mod tests;
