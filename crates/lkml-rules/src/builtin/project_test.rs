use super::*;
use crate::test_utils::{model, rule_ids, view_model};

#[test]
fn primary_key_missing() {
    let m = view_model("view: v {\n  sql_table_name: t ;;\n  measure: count { type: count }\n}\n");
    let violations = PrimaryKeyRule.check(&m);
    assert_eq!(rule_ids(&violations), vec!["primary_key"]);
    assert_eq!(violations[0].message, "view 'v' has measures but no primary key");
    assert_eq!(violations[0].entity.as_deref(), Some("view:v"));
    assert_eq!(violations[0].line, Some(1));
}

#[test]
fn primary_key_more_than_one() {
    let source = "view: v {\n  dimension: a { primary_key: yes }\n  dimension: b { primary_key: yes }\n  measure: count { type: count }\n}\n";
    let violations = PrimaryKeyRule.check(&view_model(source));
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].message, "view 'v' declares 2 primary keys: a, b");
    let related: Vec<u32> = violations[0].related.iter().map(|l| l.line).collect();
    assert_eq!(related, vec![2, 3]);
}

#[test]
fn primary_key_exemptions() {
    let cases = [
        "view: v { dimension: id { primary_key: yes } measure: count { type: count } }",
        "view: v { dimension: id {} }",
        "view: v { derived_table: { sql: SELECT 1 ;; } measure: count { type: count } }",
        "view: v { extension: required measure: count { type: count } }",
    ];
    for source in cases {
        assert!(PrimaryKeyRule.check(&view_model(source)).is_empty(), "{source}");
    }
}

#[test]
fn primary_key_inherited_from_base() {
    let m = model(&[
        ("base.view.lkml", "view: base {\n  extension: required\n  dimension: id { primary_key: yes }\n}\n"),
        ("child.view.lkml", "view: child {\n  extends: [base]\n  measure: count { type: count }\n}\n"),
    ]);
    assert!(PrimaryKeyRule.check(&m).is_empty());
}

#[test]
fn no_orphans() {
    let m = model(&[
        ("orders.view.lkml", "view: orders { sql_table_name: o ;; }"),
        ("users.view.lkml", "view: users { sql_table_name: u ;; }"),
        ("people.view.lkml", "view: people { sql_table_name: p ;; }"),
        ("base.view.lkml", "view: base { extension: required }"),
        ("child.view.lkml", "view: child { extends: [base] }"),
        ("lonely.view.lkml", "view: lonely { sql_table_name: l ;; }"),
        (
            "shop.model.lkml",
            "explore: orders {\n  join: buyers {\n    from: users\n    sql_on: ${orders.user_id} = ${buyers.id} ;;\n  }\n}\nexplore: folks {\n  view_name: people\n}\nexplore: kids {\n  from: child\n}\n",
        ),
    ]);
    let violations = NoOrphansRule.check(&m);
    let entities: Vec<_> = violations.iter().map(|v| v.entity.as_deref()).collect();
    assert_eq!(entities, vec![Some("view:lonely")]);
    assert_eq!(violations[0].severity, Severity::Info);
}
