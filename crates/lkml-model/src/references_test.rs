use super::*;
use crate::builder::build_project;
use lkml_parser::parse_document;

fn unresolved(files: &[(&str, &str)]) -> Vec<String> {
    let documents = files
        .iter()
        .map(|(path, src)| parse_document(path, src).unwrap())
        .collect();
    let outcome = build_project(documents);
    outcome
        .violations
        .iter()
        .filter(|v| v.rule_id == "unresolved_reference")
        .map(|v| v.message.clone())
        .collect()
}

const VIEWS: &str = r#"view: orders {
  sql_table_name: shop.orders ;;
  dimension: id { primary_key: yes sql: ${TABLE}.id ;; }
  dimension: user_id { sql: ${TABLE}.user_id ;; }
  dimension_group: created {
    type: time
    timeframes: [date, month]
    sql: ${TABLE}.created_at ;;
  }
  dimension_group: open {
    type: duration
    intervals: [day]
    sql_start: ${created_date} ;;
    sql_end: CURRENT_DATE ;;
  }
}
view: users {
  sql_table_name: shop.users ;;
  dimension: id { sql: ${TABLE}.id ;; }
  dimension: name { sql: ${TABLE}.name ;; }
}
"#;

#[test]
fn extract_skips_table_and_pseudo_fields() {
    let refs = extract_references(
        "${TABLE}.id = ${users.id} AND ${status} > 0 OR ${orders.SQL_TABLE_NAME} ${a.b.c} ${}",
    );
    assert_eq!(
        refs,
        vec![
            Reference {
                scope: Some("users"),
                name: "id"
            },
            Reference {
                scope: None,
                name: "status"
            },
        ]
    );
}

#[test]
fn extract_trims_whitespace() {
    let refs = extract_references("${ users.id }");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].to_string(), "${users.id}");
}

#[test]
fn substitute_replaces_every_reference() {
    assert_eq!(
        substitute_references("SELECT * FROM ${orders.SQL_TABLE_NAME} WHERE ${x} = 1", "t"),
        "SELECT * FROM t WHERE t = 1"
    );
}

#[test]
fn clean_project_has_no_unresolved_references() {
    let model = r#"explore: orders {
  join: users { sql_on: ${orders.user_id} = ${users.id} ;; }
  sql_always_where: ${orders.created_date} > '2020-01-01' ;;
}
"#;
    let found = unresolved(&[("views.lkml", VIEWS), ("shop.model.lkml", model)]);
    assert!(found.is_empty(), "{found:?}");
}

#[test]
fn alias_not_in_scope() {
    let model = "explore: orders {\n  join: users { sql_on: ${orders.user_id} = ${customers.id} ;; }\n}\n";
    let found = unresolved(&[("views.lkml", VIEWS), ("shop.model.lkml", model)]);
    assert_eq!(found.len(), 1);
    assert!(found[0].contains("${customers.id}"));
    assert!(found[0].contains("alias 'customers'"));
}

#[test]
fn unknown_field_of_joined_view() {
    let model = "explore: orders {\n  join: users { sql_on: ${orders.user_id} = ${users.nope} ;; }\n}\n";
    let found = unresolved(&[("views.lkml", VIEWS), ("shop.model.lkml", model)]);
    assert_eq!(found.len(), 1);
    assert!(found[0].contains("view 'users'"));
}

#[test]
fn missing_join_and_base_views() {
    let model = "explore: ghosts {\n  join: spirits {}\n}\n";
    let found = unresolved(&[("views.lkml", VIEWS), ("shop.model.lkml", model)]);
    assert_eq!(found.len(), 2);
    assert!(found[0].contains("view 'ghosts'"));
    assert!(found[1].contains("join 'spirits'"));
}

#[test]
fn from_aliases_explore_and_join() {
    let model = r#"explore: o {
  from: orders
  join: buyer {
    from: users
    sql_on: ${o.user_id} = ${buyer.id} ;;
  }
}
"#;
    let found = unresolved(&[("views.lkml", VIEWS), ("shop.model.lkml", model)]);
    assert!(found.is_empty(), "{found:?}");
}

#[test]
fn view_field_references() {
    let extra = r#"view: items {
  sql_table_name: shop.items ;;
  dimension: order_id { sql: ${TABLE}.order_id ;; }
  dimension: created_week { sql: ${orders.created_week} ;; }
  dimension: ok_month { sql: ${orders.created_month} ;; }
  dimension: days { sql: ${orders.days_open} ;; }
  dimension: local { sql: ${order_id} + ${missing} ;; }
  dimension: ghost { sql: ${ghost.x} ;; }
  dimension: aliased { sql: ${buyer.name} ;; }
}
explore: orders {
  join: buyer { from: users sql_on: ${orders.user_id} = ${buyer.id} ;; }
}
"#;
    let found = unresolved(&[("views.lkml", VIEWS), ("items.lkml", extra)]);
    assert_eq!(found.len(), 3, "{found:?}");
    assert!(found[0].contains("${orders.created_week}"));
    assert!(found[1].contains("${missing}"));
    assert!(found[2].contains("unknown view 'ghost'"));
}

#[test]
fn extension_views_are_not_checked() {
    let src = "view: template {\n  extension: required\n  dimension: x { sql: ${nope} ;; }\n}\n";
    assert!(unresolved(&[("t.view.lkml", src)]).is_empty());
}
