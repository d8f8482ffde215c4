//! Built-in rules

pub mod field;
pub mod file;
pub mod project;

use crate::error::RulesResult;
use crate::rule::Rule;
use lkml_core::RuleOptions;

/// Ids of every built-in rule, in registration order.
pub const RULE_IDS: &[&str] = &[
    "description",
    "drill_down",
    "yesno_name",
    "count_name",
    "all_caps",
    "field_naming",
    "lexicon",
    "primary_key_hidden",
    "data_source",
    "one_view_per_file",
    "filename_viewname_match",
    "duplicate_property",
    "unknown_block_kind",
    "derived_table_sql",
    "primary_key",
    "no_orphans",
];

/// Built-in rules with default options.
pub(crate) fn default_rules() -> Vec<Rule> {
    build(
        field::FieldNamingRule::default(),
        field::YesNoNameRule::default(),
        field::LexiconRule::default(),
    )
}

/// Built-in rules with options from configuration.
pub(crate) fn configured_rules(options: &RuleOptions) -> RulesResult<Vec<Rule>> {
    Ok(build(
        field::FieldNamingRule::new(&options.field_naming.pattern)?,
        field::YesNoNameRule::new(options.yesno_name.prefixes.clone()),
        field::LexiconRule::new(options.lexicon.forbidden.clone()),
    ))
}

fn build(
    field_naming: field::FieldNamingRule,
    yesno_name: field::YesNoNameRule,
    lexicon: field::LexiconRule,
) -> Vec<Rule> {
    vec![
        Rule::field(field::DescriptionRule),
        Rule::field(field::DrillDownRule),
        Rule::field(yesno_name),
        Rule::field(field::CountNameRule),
        Rule::field(field::AllCapsRule),
        Rule::field(field_naming),
        Rule::field(lexicon),
        Rule::field(field::PrimaryKeyHiddenRule),
        Rule::file(file::DataSourceRule),
        Rule::file(file::OneViewPerFileRule),
        Rule::file(file::FilenameViewnameMatchRule),
        Rule::file(file::DuplicatePropertyRule),
        Rule::file(file::UnknownBlockKindRule),
        Rule::file(file::DerivedTableSqlRule),
        Rule::project(project::PrimaryKeyRule),
        Rule::project(project::NoOrphansRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_ids_match_registration_order() {
        let ids: Vec<&str> = default_rules().iter().map(Rule::id).collect();
        assert_eq!(ids, RULE_IDS);
    }

    #[test]
    fn every_rule_has_a_description() {
        for rule in default_rules() {
            assert!(!rule.description().is_empty(), "{}", rule.id());
        }
    }
}
