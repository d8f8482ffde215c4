//! Field rules: naming and documentation conventions of single fields.

use crate::error::{RulesError, RulesResult};
use crate::rule::{field_violation, FieldRule};
use lkml_core::{BlockKind, Severity, Violation};
use lkml_model::{Entity, Field};
use regex::Regex;

/// Measure types that pass a value through rather than aggregate rows.
const PASSTHROUGH_MEASURE_TYPES: &[&str] = &["number", "string", "yesno", "date", "date_time"];

/// Dimensions, dimension groups and measures must be described.
pub struct DescriptionRule;

impl FieldRule for DescriptionRule {
    fn id(&self) -> &'static str {
        "description"
    }

    fn description(&self) -> &'static str {
        "Visible dimensions, dimension groups and measures declare a description"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, field: &Field, _entity: &Entity) -> Vec<Violation> {
        let applies = matches!(
            field.kind,
            BlockKind::Dimension | BlockKind::DimensionGroup | BlockKind::Measure
        );
        if !applies || field.is_hidden() {
            return Vec::new();
        }
        let described = field
            .get_str("description")
            .is_some_and(|d| !d.trim().is_empty());
        if described {
            return Vec::new();
        }
        vec![field_violation(
            self,
            field,
            format!("{} '{}' has no description", field.kind, field.name),
        )]
    }
}

/// Aggregating measures should let users drill into their rows.
pub struct DrillDownRule;

impl FieldRule for DrillDownRule {
    fn id(&self) -> &'static str {
        "drill_down"
    }

    fn description(&self) -> &'static str {
        "Visible aggregating measures declare drill_fields"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, field: &Field, _entity: &Entity) -> Vec<Violation> {
        if field.kind != BlockKind::Measure || field.is_hidden() || field.get("drill_fields").is_some() {
            return Vec::new();
        }
        if field
            .field_type()
            .is_some_and(|t| PASSTHROUGH_MEASURE_TYPES.contains(&t))
        {
            return Vec::new();
        }
        vec![field_violation(
            self,
            field,
            format!("measure '{}' has no drill_fields", field.name),
        )]
    }
}

/// `type: yesno` dimensions read as questions.
pub struct YesNoNameRule {
    prefixes: Vec<String>,
}

impl YesNoNameRule {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }
}

impl Default for YesNoNameRule {
    fn default() -> Self {
        Self::new(vec!["is_".to_string(), "has_".to_string()])
    }
}

impl FieldRule for YesNoNameRule {
    fn id(&self) -> &'static str {
        "yesno_name"
    }

    fn description(&self) -> &'static str {
        "yesno dimensions start with a configured prefix such as is_ or has_"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, field: &Field, _entity: &Entity) -> Vec<Violation> {
        if field.kind != BlockKind::Dimension || field.field_type() != Some("yesno") {
            return Vec::new();
        }
        if self.prefixes.iter().any(|p| field.name.starts_with(p.as_str())) {
            return Vec::new();
        }
        vec![field_violation(
            self,
            field,
            format!(
                "yesno dimension '{}' should start with one of: {}",
                field.name,
                self.prefixes.join(", ")
            ),
        )]
    }
}

/// Count measures say so in their name.
pub struct CountNameRule;

impl FieldRule for CountNameRule {
    fn id(&self) -> &'static str {
        "count_name"
    }

    fn description(&self) -> &'static str {
        "count and count_distinct measures are named count, count_* or *_count"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, field: &Field, _entity: &Entity) -> Vec<Violation> {
        let is_count = matches!(field.field_type(), Some("count") | Some("count_distinct"));
        if field.kind != BlockKind::Measure || !is_count {
            return Vec::new();
        }
        let name = field.name.as_str();
        if name == "count" || name.starts_with("count_") || name.ends_with("_count") {
            return Vec::new();
        }
        vec![field_violation(
            self,
            field,
            format!("count measure '{name}' should be named count_* or *_count"),
        )]
    }
}

pub struct AllCapsRule;

impl FieldRule for AllCapsRule {
    fn id(&self) -> &'static str {
        "all_caps"
    }

    fn description(&self) -> &'static str {
        "Field names are not written in upper case"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, field: &Field, _entity: &Entity) -> Vec<Violation> {
        let name = field.name.as_str();
        let upper = name.chars().any(|c| c.is_uppercase()) && !name.chars().any(|c| c.is_lowercase());
        if !upper {
            return Vec::new();
        }
        vec![field_violation(
            self,
            field,
            format!("{} name '{}' is all caps", field.kind, name),
        )]
    }
}

/// Field names follow a configured pattern.
pub struct FieldNamingRule {
    pattern: Regex,
}

impl FieldNamingRule {
    pub fn new(pattern: &str) -> RulesResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| RulesError::InvalidOption {
            rule: "field_naming".to_string(),
            message: format!("invalid pattern '{pattern}': {e}"),
        })?;
        Ok(Self { pattern })
    }
}

impl Default for FieldNamingRule {
    fn default() -> Self {
        Self {
            pattern: Regex::new("^[a-z][a-z0-9_]*$").expect("valid regex literal"),
        }
    }
}

impl FieldRule for FieldNamingRule {
    fn id(&self) -> &'static str {
        "field_naming"
    }

    fn description(&self) -> &'static str {
        "Field names match the configured naming pattern"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, field: &Field, _entity: &Entity) -> Vec<Violation> {
        if self.pattern.is_match(&field.name) {
            return Vec::new();
        }
        vec![field_violation(
            self,
            field,
            format!(
                "{} name '{}' does not match pattern {}",
                field.kind,
                field.name,
                self.pattern.as_str()
            ),
        )]
    }
}

/// Forbidden phrases in names, labels and descriptions.
pub struct LexiconRule {
    /// Lower-cased phrases, paired with the configured spelling
    forbidden: Vec<(String, String)>,
}

impl LexiconRule {
    pub fn new(forbidden: Vec<String>) -> Self {
        Self {
            forbidden: forbidden
                .into_iter()
                .filter(|p| !p.is_empty())
                .map(|p| (p.to_lowercase(), p))
                .collect(),
        }
    }
}

impl Default for LexiconRule {
    fn default() -> Self {
        Self::new(vec!["TODO".to_string(), "FIXME".to_string(), "TBD".to_string()])
    }
}

impl FieldRule for LexiconRule {
    fn id(&self) -> &'static str {
        "lexicon"
    }

    fn description(&self) -> &'static str {
        "Field names, labels and descriptions avoid forbidden phrases"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, field: &Field, _entity: &Entity) -> Vec<Violation> {
        let texts = [
            ("name", Some(field.name.as_str())),
            ("label", field.get_str("label")),
            ("description", field.get_str("description")),
        ];
        let mut violations = Vec::new();
        for (what, text) in texts {
            let Some(text) = text else {
                continue;
            };
            let lowered = text.to_lowercase();
            for (needle, phrase) in &self.forbidden {
                if lowered.contains(needle.as_str()) {
                    violations.push(field_violation(
                        self,
                        field,
                        format!("{} of '{}' contains '{}'", what, field.name, phrase),
                    ));
                }
            }
        }
        violations
    }
}

/// Primary keys are plumbing, not something users pick from the field list.
pub struct PrimaryKeyHiddenRule;

impl FieldRule for PrimaryKeyHiddenRule {
    fn id(&self) -> &'static str {
        "primary_key_hidden"
    }

    fn description(&self) -> &'static str {
        "Primary key dimensions are hidden"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, field: &Field, _entity: &Entity) -> Vec<Violation> {
        if !field.is_primary_key() || field.is_hidden() {
            return Vec::new();
        }
        vec![field_violation(
            self,
            field,
            format!("primary key '{}' is not hidden", field.name),
        )]
    }
}

#[cfg(test)]
#[path = "field_test.rs"]
mod tests;
