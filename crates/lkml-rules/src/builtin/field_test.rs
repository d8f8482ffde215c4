use super::*;
use crate::test_utils::{field, rule_ids, view_model};

fn check(rule: &dyn FieldRule, source: &str, name: &str) -> Vec<Violation> {
    let model = view_model(source);
    let (entity, f) = field(&model, "v", name);
    rule.check(f, entity)
}

#[test]
fn description_required_on_visible_dimensions() {
    let violations = check(&DescriptionRule, "view: v { dimension: status {} }", "status");
    assert_eq!(rule_ids(&violations), vec!["description"]);
    assert_eq!(violations[0].message, "dimension 'status' has no description");
    assert_eq!(violations[0].entity.as_deref(), Some("v.status"));
    assert_eq!(violations[0].severity, Severity::Warning);
}

#[test]
fn description_blank_counts_as_missing() {
    let violations = check(
        &DescriptionRule,
        r#"view: v { measure: total { description: "   " } }"#,
        "total",
    );
    assert_eq!(violations.len(), 1);
}

#[test]
fn description_exemptions() {
    let described = r#"view: v { dimension: a { description: "Order status" } }"#;
    assert!(check(&DescriptionRule, described, "a").is_empty());

    let hidden = "view: v { dimension: a { hidden: yes } }";
    assert!(check(&DescriptionRule, hidden, "a").is_empty());

    let filter = "view: v { filter: a { type: string } }";
    assert!(check(&DescriptionRule, filter, "a").is_empty());
}

#[test]
fn drill_down_on_aggregates_only() {
    let count = "view: v { measure: count { type: count } }";
    assert_eq!(rule_ids(&check(&DrillDownRule, count, "count")), vec!["drill_down"]);

    let drilled = "view: v { measure: count { type: count drill_fields: [id] } }";
    assert!(check(&DrillDownRule, drilled, "count").is_empty());

    let number = "view: v { measure: ratio { type: number } }";
    assert!(check(&DrillDownRule, number, "ratio").is_empty());

    let hidden = "view: v { measure: count { type: count hidden: yes } }";
    assert!(check(&DrillDownRule, hidden, "count").is_empty());

    let dimension = "view: v { dimension: id {} }";
    assert!(check(&DrillDownRule, dimension, "id").is_empty());
}

#[test]
fn yesno_name_uses_prefixes() {
    let bad = "view: v { dimension: returned { type: yesno } }";
    let violations = check(&YesNoNameRule::default(), bad, "returned");
    assert_eq!(violations.len(), 1);
    assert!(violations[0].message.contains("is_, has_"));

    let good = "view: v { dimension: is_returned { type: yesno } }";
    assert!(check(&YesNoNameRule::default(), good, "is_returned").is_empty());

    let custom = YesNoNameRule::new(vec!["was_".to_string()]);
    let was = "view: v { dimension: was_returned { type: yesno } }";
    assert!(check(&custom, was, "was_returned").is_empty());
    assert_eq!(check(&custom, good, "is_returned").len(), 1);
}

#[test]
fn yesno_name_ignores_other_types() {
    let source = "view: v { dimension: returned { type: string } }";
    assert!(check(&YesNoNameRule::default(), source, "returned").is_empty());
}

#[test]
fn count_name_accepts_count_forms() {
    for name in ["count", "count_orders", "order_count"] {
        let source = format!("view: v {{ measure: {name} {{ type: count_distinct }} }}");
        assert!(check(&CountNameRule, &source, name).is_empty(), "{name}");
    }
    let bad = "view: v { measure: orders { type: count } }";
    let violations = check(&CountNameRule, bad, "orders");
    assert_eq!(rule_ids(&violations), vec!["count_name"]);

    let sum = "view: v { measure: revenue { type: sum } }";
    assert!(check(&CountNameRule, sum, "revenue").is_empty());
}

#[test]
fn all_caps_names() {
    let upper = "view: v { dimension: STATUS {} }";
    assert_eq!(rule_ids(&check(&AllCapsRule, upper, "STATUS")), vec!["all_caps"]);

    let mixed = "view: v { dimension: Status {} }";
    assert!(check(&AllCapsRule, mixed, "Status").is_empty());

    let digits = "view: v { dimension: a1 {} }";
    assert!(check(&AllCapsRule, digits, "a1").is_empty());
}

#[test]
fn field_naming_default_pattern() {
    let mixed = "view: v { dimension: orderStatus {} }";
    let violations = check(&FieldNamingRule::default(), mixed, "orderStatus");
    assert_eq!(violations.len(), 1);
    assert!(violations[0].message.contains("^[a-z][a-z0-9_]*$"));

    let snake = "view: v { dimension: order_status {} }";
    assert!(check(&FieldNamingRule::default(), snake, "order_status").is_empty());
}

#[test]
fn field_naming_invalid_pattern() {
    let err = FieldNamingRule::new("([").err().unwrap();
    assert!(matches!(err, RulesError::InvalidOption { ref rule, .. } if rule == "field_naming"));
    assert!(err.to_string().contains("[L003]"));
}

#[test]
fn lexicon_checks_name_label_and_description() {
    let source = r#"view: v {
  dimension: todo_status {
    label: "Status tbd"
    description: "fine"
  }
}"#;
    let violations = check(&LexiconRule::default(), source, "todo_status");
    let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "name of 'todo_status' contains 'TODO'",
            "label of 'todo_status' contains 'TBD'",
        ]
    );
}

#[test]
fn lexicon_empty_list_flags_nothing() {
    let rule = LexiconRule::new(vec![String::new()]);
    let source = "view: v { dimension: todo {} }";
    assert!(check(&rule, source, "todo").is_empty());
}

#[test]
fn primary_key_hidden() {
    let visible = "view: v { dimension: id { primary_key: yes } }";
    let violations = check(&PrimaryKeyHiddenRule, visible, "id");
    assert_eq!(rule_ids(&violations), vec!["primary_key_hidden"]);
    assert_eq!(violations[0].severity, Severity::Info);

    let hidden = "view: v { dimension: id { primary_key: yes hidden: yes } }";
    assert!(check(&PrimaryKeyHiddenRule, hidden, "id").is_empty());
}

#[test]
fn inherited_field_reports_at_declaring_location() {
    let model = crate::test_utils::model(&[
        ("base.view.lkml", "view: base {\n  extension: required\n  dimension: status {}\n}\n"),
        ("child.view.lkml", "view: child {\n  extends: [base]\n}\n"),
    ]);
    let (entity, f) = field(&model, "child", "status");
    let violations = DescriptionRule.check(f, entity);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].path, "base.view.lkml");
    assert_eq!(violations[0].line, Some(3));
    assert_eq!(violations[0].entity.as_deref(), Some("child.status"));
}
