use super::*;

fn violation(path: &str, line: Option<u32>, rule: &str) -> Violation {
    let location = match line {
        Some(l) => SourceLocation::point(path, l, 1),
        None => SourceLocation::file(path),
    };
    Violation::new(&RuleId::new(rule), Severity::Warning, "msg", &location)
}

#[test]
fn file_level_violation_has_no_line() {
    let v = violation("a.view.lkml", None, "one_view_per_file");
    assert_eq!(v.line, None);
    assert_eq!(v.column, None);
    assert_eq!(v.to_string(), "a.view.lkml warning [one_view_per_file] msg");
}

#[test]
fn display_includes_position() {
    let v = violation("a.view.lkml", Some(7), "description");
    assert_eq!(v.to_string(), "a.view.lkml:7:1 warning [description] msg");
}

#[test]
fn sort_groups_by_input_path_order() {
    let order = vec!["z.view.lkml".to_string(), "a.view.lkml".to_string()];
    let mut vs = vec![
        violation("a.view.lkml", Some(1), "all_caps"),
        violation("z.view.lkml", Some(9), "all_caps"),
        violation("z.view.lkml", Some(2), "description"),
    ];
    sort_violations(&mut vs, &order);
    let got: Vec<(&str, Option<u32>)> = vs.iter().map(|v| (v.path.as_str(), v.line)).collect();
    assert_eq!(
        got,
        vec![
            ("z.view.lkml", Some(2)),
            ("z.view.lkml", Some(9)),
            ("a.view.lkml", Some(1)),
        ]
    );
}

#[test]
fn sort_puts_file_level_first_then_rule_id() {
    let order = vec!["a.view.lkml".to_string()];
    let mut vs = vec![
        violation("a.view.lkml", Some(3), "lexicon"),
        violation("a.view.lkml", Some(3), "all_caps"),
        violation("a.view.lkml", None, "one_view_per_file"),
    ];
    sort_violations(&mut vs, &order);
    let rules: Vec<&str> = vs.iter().map(|v| v.rule_id.as_str()).collect();
    assert_eq!(rules, vec!["one_view_per_file", "all_caps", "lexicon"]);
}

#[test]
fn unknown_paths_sort_after_known_paths() {
    let order = vec!["b.lkml".to_string()];
    let mut vs = vec![
        violation("c.lkml", Some(1), "x"),
        violation("a.lkml", Some(1), "x"),
        violation("b.lkml", Some(1), "x"),
    ];
    sort_violations(&mut vs, &order);
    let paths: Vec<&str> = vs.iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, vec!["b.lkml", "a.lkml", "c.lkml"]);
}

#[test]
fn engine_origins() {
    assert!(!ViolationOrigin::Lint.is_engine());
    assert!(ViolationOrigin::RuleFault.is_engine());
    let v = violation("a.lkml", Some(1), "parse_error").with_origin(ViolationOrigin::Parse);
    let json = serde_json::to_value(&v).unwrap();
    assert_eq!(json["origin"], "parse");
    assert_eq!(json["severity"], "warning");
    assert!(json.get("related").is_none());
}

#[test]
fn severity_ordering() {
    assert!(Severity::Info < Severity::Warning);
    assert!(Severity::Warning < Severity::Error);
}
