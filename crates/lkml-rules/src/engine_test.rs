use super::*;
use crate::builtin::field::DescriptionRule;
use crate::rule::{FieldRule, FileRule, ProjectRule};
use crate::severity::OverriddenSeverity;
use crate::test_utils::{model, rule_ids};
use lkml_core::{Document, RuleId, Severity, ViolationOrigin};
use lkml_model::{Entity, Field};

struct PanicOnField(&'static str);

impl FieldRule for PanicOnField {
    fn id(&self) -> &'static str {
        "panicky"
    }
    fn description(&self) -> &'static str {
        "panics on one field"
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, field: &Field, _entity: &Entity) -> Vec<Violation> {
        if field.name == self.0 {
            panic!("boom on {}", field.name);
        }
        Vec::new()
    }
}

struct SlowFile;

impl FileRule for SlowFile {
    fn id(&self) -> &'static str {
        "slow"
    }
    fn description(&self) -> &'static str {
        "sleeps"
    }
    fn default_severity(&self) -> Severity {
        Severity::Info
    }
    fn check(&self, _document: &Document) -> Vec<Violation> {
        std::thread::sleep(Duration::from_millis(500));
        Vec::new()
    }
}

struct CountViews;

impl ProjectRule for CountViews {
    fn id(&self) -> &'static str {
        "count_views"
    }
    fn description(&self) -> &'static str {
        "reports the number of views"
    }
    fn default_severity(&self) -> Severity {
        Severity::Info
    }
    fn check(&self, model: &ProjectModel) -> Vec<Violation> {
        vec![Violation::for_file(
            &RuleId::new(self.id()),
            self.default_severity(),
            format!("{} views", model.views().count()),
            PROJECT_PATH,
        )]
    }
}

struct PanicOnProject;

impl ProjectRule for PanicOnProject {
    fn id(&self) -> &'static str {
        "panicky_project"
    }
    fn description(&self) -> &'static str {
        "always panics"
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, _model: &ProjectModel) -> Vec<Violation> {
        panic!("project boom")
    }
}

fn sample() -> Arc<ProjectModel> {
    Arc::new(model(&[
        (
            "orders.view.lkml",
            "view: orders {\n  dimension: id {}\n  dimension: status {}\n}\n",
        ),
        (
            "users.view.lkml",
            "view: users {\n  dimension: name {}\n}\n",
        ),
    ]))
}

fn registry(rules: Vec<Rule>) -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    for rule in rules {
        registry.register(rule).unwrap();
    }
    registry
}

#[tokio::test]
async fn panicking_rule_yields_one_fault_and_others_survive() {
    let engine = RuleEngine::new(
        registry(vec![
            Rule::field(PanicOnField("status")),
            Rule::field(DescriptionRule),
        ]),
        EngineOptions::default(),
    );
    let violations = engine.run(sample()).await;

    let faults: Vec<&Violation> = violations
        .iter()
        .filter(|v| v.origin == ViolationOrigin::RuleFault)
        .collect();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].rule_id, "panicky");
    assert_eq!(faults[0].severity, Severity::Error);
    assert_eq!(faults[0].entity.as_deref(), Some("orders.status"));
    assert_eq!(faults[0].line, Some(3));
    assert!(faults[0].message.contains("boom on status"));

    let described: Vec<_> = violations
        .iter()
        .filter(|v| v.rule_id == "description")
        .map(|v| v.entity.as_deref())
        .collect();
    assert_eq!(
        described,
        vec![Some("orders.id"), Some("orders.status"), Some("users.name")]
    );
}

#[tokio::test]
async fn slow_rule_times_out() {
    let options = EngineOptions {
        timeout: Duration::from_millis(50),
        ..EngineOptions::default()
    };
    let engine = RuleEngine::new(registry(vec![Rule::file(SlowFile)]), options);
    let violations = engine.run(sample()).await;

    assert_eq!(violations.len(), 2);
    assert!(violations.iter().all(|v| v.origin == ViolationOrigin::RuleFault));
    assert_eq!(violations[0].path, "orders.view.lkml");
    assert_eq!(violations[0].line, None);
    assert!(violations.iter().all(|v| v.entity.is_none()));
    assert!(violations[0].message.contains("timed out"));
    assert_eq!(violations[1].path, "users.view.lkml");
}

#[tokio::test]
async fn project_fault_has_no_entity() {
    let engine = RuleEngine::new(
        registry(vec![Rule::project(PanicOnProject)]),
        EngineOptions::default(),
    );
    let violations = engine.run(sample()).await;

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].origin, ViolationOrigin::RuleFault);
    assert_eq!(violations[0].path, PROJECT_PATH);
    assert_eq!(violations[0].entity, None);
    assert!(violations[0].message.contains("panicked on project: project boom"));
}

#[tokio::test]
async fn project_rules_run_once() {
    let engine = RuleEngine::new(registry(vec![Rule::project(CountViews)]), EngineOptions::default());
    let violations = engine.run(sample()).await;
    assert_eq!(rule_ids(&violations), vec!["count_views"]);
    assert_eq!(violations[0].message, "2 views");
}

#[tokio::test]
async fn severity_overrides_apply_after_collection() {
    let mut options = EngineOptions::default();
    options
        .severity_overrides
        .set("description", OverriddenSeverity::Level(Severity::Error));
    let engine = RuleEngine::new(registry(vec![Rule::field(DescriptionRule)]), options);
    let violations = engine.run(sample()).await;
    assert_eq!(violations.len(), 3);
    assert!(violations.iter().all(Violation::is_error));
}

#[tokio::test]
async fn extension_views_are_not_field_instances() {
    let m = Arc::new(model(&[(
        "base.view.lkml",
        "view: base {\n  extension: required\n  dimension: a {}\n}\n",
    )]));
    let engine = RuleEngine::new(registry(vec![Rule::field(DescriptionRule)]), EngineOptions::default());
    assert!(engine.run(m).await.is_empty());
}

#[tokio::test]
async fn output_is_independent_of_concurrency() {
    let rules = || registry(vec![Rule::field(DescriptionRule), Rule::project(CountViews)]);
    let serial = RuleEngine::new(
        rules(),
        EngineOptions {
            max_concurrency: 1,
            ..EngineOptions::default()
        },
    );
    let parallel = RuleEngine::new(
        rules(),
        EngineOptions {
            max_concurrency: 16,
            ..EngineOptions::default()
        },
    );
    let model = sample();
    assert_eq!(
        serial.run(Arc::clone(&model)).await,
        parallel.run(model).await
    );
}

#[test]
fn options_from_config() {
    let config = LintConfig::from_yaml(
        "rules:\n  all_caps: error\nengine:\n  timeout_secs: 5\n  threads: 3\n",
    )
    .unwrap();
    let options = EngineOptions::from_config(&config);
    assert_eq!(options.timeout, Duration::from_secs(5));
    assert_eq!(options.max_concurrency, 3);
    assert_eq!(
        options.severity_overrides.get("all_caps"),
        Some(OverriddenSeverity::Level(Severity::Error))
    );
}
