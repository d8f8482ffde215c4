//! File rules: checks that only need one parsed document.

use crate::rule::{file_violation, FileRule};
use lkml_core::{Block, BlockKind, Document, Severity, SourceLocation, Value, Violation};
use lkml_model::substitute_references;
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Nested keywords that are valid LookML but have no dedicated
/// [`BlockKind`].
const KNOWN_NESTED_KINDS: &[&str] = &[
    "access_filter",
    "allowed_value",
    "always_filter",
    "application",
    "assert",
    "bind_all_filters",
    "bind_filters",
    "case",
    "column",
    "conditionally_filter",
    "constant",
    "derived_column",
    "explore_source",
    "form_param",
    "local_dependency",
    "localization_settings",
    "named_value_format",
    "option",
    "override_constant",
    "param",
    "remote_dependency",
    "user_attribute_param",
    "visualization",
    "when",
];

/// Top-level views that are neither refinements nor templates.
fn concrete_views(document: &Document) -> impl Iterator<Item = &Block> {
    document.views().filter(|v| {
        !v.name_or_empty().starts_with('+') && v.get_str("extension") != Some("required")
    })
}

/// Every view needs somewhere to read rows from.
pub struct DataSourceRule;

impl FileRule for DataSourceRule {
    fn id(&self) -> &'static str {
        "data_source"
    }

    fn description(&self) -> &'static str {
        "Views declare sql_table_name or derived_table"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        concrete_views(document)
            // Extending views inherit their source from the base.
            .filter(|v| !v.has("extends"))
            .filter(|v| !v.has("sql_table_name") && !v.has("derived_table"))
            .map(|v| {
                file_violation(
                    self,
                    &v.location,
                    format!(
                        "view '{}' has neither sql_table_name nor derived_table",
                        v.name_or_empty()
                    ),
                )
                .with_entity(format!("view:{}", v.name_or_empty()))
            })
            .collect()
    }
}

pub struct OneViewPerFileRule;

impl FileRule for OneViewPerFileRule {
    fn id(&self) -> &'static str {
        "one_view_per_file"
    }

    fn description(&self) -> &'static str {
        "A view file defines at most one view"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        if !document.is_view_file() {
            return Vec::new();
        }
        let views: Vec<&Block> = document
            .views()
            .filter(|v| !v.name_or_empty().starts_with('+'))
            .collect();
        views
            .iter()
            .skip(1)
            .map(|v| {
                file_violation(
                    self,
                    &v.location,
                    format!(
                        "{} defines {} views; move view '{}' to its own file",
                        document.file_name(),
                        views.len(),
                        v.name_or_empty()
                    ),
                )
                .with_entity(format!("view:{}", v.name_or_empty()))
                .with_related(views[0].location.clone())
            })
            .collect()
    }
}

pub struct FilenameViewnameMatchRule;

impl FileRule for FilenameViewnameMatchRule {
    fn id(&self) -> &'static str {
        "filename_viewname_match"
    }

    fn description(&self) -> &'static str {
        "A file named x.view.lkml defines view x"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        if !document.is_view_file() {
            return Vec::new();
        }
        let stem = document.stem();
        let mut views = document
            .views()
            .filter(|v| !v.name_or_empty().starts_with('+'));
        let Some(first) = views.next() else {
            return Vec::new();
        };
        if first.name_or_empty() == stem || views.any(|v| v.name_or_empty() == stem) {
            return Vec::new();
        }
        vec![file_violation(
            self,
            &first.location,
            format!(
                "file {} defines view '{}', expected view '{}'",
                document.file_name(),
                first.name_or_empty(),
                stem
            ),
        )
        .with_entity(format!("view:{}", first.name_or_empty()))]
    }
}

/// The same property twice in one block: only the last one takes effect.
pub struct DuplicatePropertyRule;

impl DuplicatePropertyRule {
    fn check_block(&self, block: &Block, violations: &mut Vec<Violation>) {
        for (name, occurrences) in block.duplicate_properties() {
            let first = occurrences[0];
            for later in &occurrences[1..] {
                violations.push(
                    file_violation(
                        self,
                        &later.location,
                        format!(
                            "property '{}' is declared {} times in {} {}; the last one wins",
                            name,
                            occurrences.len(),
                            block.kind,
                            describe_block(block)
                        ),
                    )
                    .with_related(first.location.clone()),
                );
            }
        }
    }
}

fn describe_block(block: &Block) -> String {
    match &block.name {
        Some(name) => format!("'{name}'"),
        None => "block".to_string(),
    }
}

impl FileRule for DuplicatePropertyRule {
    fn id(&self) -> &'static str {
        "duplicate_property"
    }

    fn description(&self) -> &'static str {
        "A block does not declare the same property twice"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        let mut violations = Vec::new();
        let top = Block {
            kind: BlockKind::Other("file".to_string()),
            name: Some(document.file_name().to_string()),
            properties: document.properties.clone(),
            children: Vec::new(),
            location: SourceLocation::file(&document.path),
        };
        self.check_block(&top, &mut violations);
        for block in document.all_blocks() {
            self.check_block(block, &mut violations);
        }
        violations
    }
}

pub struct UnknownBlockKindRule;

impl FileRule for UnknownBlockKindRule {
    fn id(&self) -> &'static str {
        "unknown_block_kind"
    }

    fn description(&self) -> &'static str {
        "Blocks use a known LookML keyword"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        document
            .all_blocks()
            .into_iter()
            .filter(|b| !b.kind.is_known() && !KNOWN_NESTED_KINDS.contains(&b.kind.as_str()))
            .map(|b| {
                file_violation(
                    self,
                    &b.location,
                    format!("unknown block kind '{}'", b.kind),
                )
            })
            .collect()
    }
}

/// Derived table SQL must at least be a parseable query.
pub struct DerivedTableSqlRule;

impl DerivedTableSqlRule {
    fn check_sql(&self, view: &Block, derived: &Block) -> Option<Violation> {
        let property = derived.property("sql")?;
        let sql = property.value.as_str()?;
        if is_templated(sql) {
            return None;
        }
        let view_name = view.name_or_empty();
        let message = if sql.trim().is_empty() {
            format!("derived_table of view '{view_name}' has empty SQL")
        } else {
            let substituted = substitute_references(sql, "lkml_ref");
            match Parser::parse_sql(&GenericDialect {}, &substituted) {
                Err(e) => format!("derived_table SQL of view '{view_name}' does not parse: {e}"),
                Ok(statements) => match statements.as_slice() {
                    [Statement::Query(_)] => return None,
                    [_] => format!("derived_table SQL of view '{view_name}' is not a SELECT query"),
                    _ => format!(
                        "derived_table SQL of view '{view_name}' has {} statements, expected one query",
                        statements.len()
                    ),
                },
            }
        };
        Some(
            file_violation(self, &property.location, message)
                .with_entity(format!("view:{view_name}")),
        )
    }
}

/// Liquid and constant substitutions make SQL unparseable before
/// rendering.
fn is_templated(sql: &str) -> bool {
    sql.contains("{%") || sql.contains("{{") || sql.contains("@{")
}

impl FileRule for DerivedTableSqlRule {
    fn id(&self) -> &'static str {
        "derived_table_sql"
    }

    fn description(&self) -> &'static str {
        "derived_table SQL parses as a single query"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        document
            .views()
            .filter_map(|view| {
                let derived = view.get("derived_table").and_then(Value::as_block)?;
                self.check_sql(view, derived)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
