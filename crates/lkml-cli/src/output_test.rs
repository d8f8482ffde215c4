use super::*;
use lkml_core::{RuleId, SourceLocation};

fn report(violations: Vec<Violation>) -> LintReport {
    LintReport {
        violations,
        documents: 2,
        entities: 3,
        rules: 16,
    }
}

fn sample() -> Vec<Violation> {
    vec![
        Violation::new(
            &RuleId::new("description"),
            Severity::Warning,
            "dimension 'status' has no description",
            &SourceLocation::point("views/orders.view.lkml", 7, 3),
        )
        .with_entity("orders.status"),
        Violation::for_file(
            &RuleId::new("parse_error"),
            Severity::Error,
            "unexpected end of file",
            "views/broken.view.lkml",
        ),
    ]
}

#[test]
fn text_lists_violations_and_summary() {
    let report = report(sample());
    let shown: Vec<&Violation> = report.violations.iter().collect();
    let summary = Summary::new(&report, &shown);
    let text = render_text(&shown, &summary);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "views/orders.view.lkml:7:3 warning [description] dimension 'status' has no description",
            "    in orders.status",
            "views/broken.view.lkml error [parse_error] unexpected end of file",
            "",
            "2 violations (1 errors, 1 warnings, 0 info) in 2 files, 16 rules checked",
        ]
    );
}

#[test]
fn text_without_violations_is_just_the_summary() {
    let report = report(Vec::new());
    let summary = Summary::new(&report, &[]);
    assert_eq!(
        render_text(&[], &summary),
        "0 violations (0 errors, 0 warnings, 0 info) in 2 files, 16 rules checked\n"
    );
}

#[test]
fn json_contains_violations_and_summary() {
    let report = report(sample());
    let shown: Vec<&Violation> = report.violations.iter().take(1).collect();
    let summary = Summary::new(&report, &shown);
    let json = render_json(&shown, &summary).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["summary"]["warnings"], 1);
    assert_eq!(value["summary"]["errors"], 0);
    let first = &value["violations"][0];
    assert_eq!(first["rule_id"], "description");
    assert_eq!(first["severity"], "warning");
    assert_eq!(first["origin"], "lint");
    assert_eq!(first["line"], 7);
    assert_eq!(first["entity"], "orders.status");
}
