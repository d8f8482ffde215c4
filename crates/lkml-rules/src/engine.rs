//! Rule engine: runs every registered rule against a resolved model.
//!
//! Each rule × instance pair (one field, one file, or the whole project)
//! runs on its own blocking task. Concurrency is bounded by a semaphore
//! and every task has a time budget. A panic or timeout is turned into a
//! single `rule_fault` violation for that pair; every other pair still
//! reports.

use crate::error::RuleFault;
use crate::registry::RuleRegistry;
use crate::rule::Rule;
use crate::severity::{apply_severity_overrides, SeverityOverrides};
use lkml_core::{sort_violations, LintConfig, SourceLocation, Violation};
use lkml_model::{EntityId, EntityKind, ProjectModel};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinError;

/// Path used for faults of project rules, which have no file of their own.
pub const PROJECT_PATH: &str = "<project>";

/// Default per-instance time budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the engine runs rules.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Time budget for one rule instance
    pub timeout: Duration,
    /// Maximum rule instances running at once
    pub max_concurrency: usize,
    pub severity_overrides: SeverityOverrides,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: default_concurrency(),
            severity_overrides: SeverityOverrides::default(),
        }
    }
}

impl EngineOptions {
    /// Engine settings and severity overrides from configuration.
    pub fn from_config(config: &LintConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.engine.timeout_secs),
            max_concurrency: config.engine.threads.unwrap_or_else(default_concurrency),
            severity_overrides: SeverityOverrides::from_config(&config.rules),
        }
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// What one rule task is pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Instance {
    Field { entity: EntityId, field: usize },
    File { document: usize },
    Project,
}

/// One rule × instance pair.
#[derive(Debug, Clone)]
struct Task {
    rule: Rule,
    instance: Instance,
}

impl Task {
    fn run(&self, model: &ProjectModel) -> Vec<Violation> {
        match (&self.rule, self.instance) {
            (Rule::Field(rule), Instance::Field { entity, field }) => {
                let entity = &model.entities()[entity];
                rule.check(&entity.fields[field], entity)
            }
            (Rule::File(rule), Instance::File { document }) => {
                rule.check(&model.documents()[document])
            }
            (Rule::Project(rule), Instance::Project) => rule.check(model),
            _ => Vec::new(),
        }
    }

    /// Name of the instance for fault messages.
    fn describe(&self, model: &ProjectModel) -> String {
        match self.instance {
            Instance::Field { entity, field } => {
                model.entities()[entity].fields[field].qualified_name()
            }
            Instance::File { document } => model.documents()[document].path.clone(),
            Instance::Project => "project".to_string(),
        }
    }

    /// Where a fault of this task is reported.
    fn location(&self, model: &ProjectModel) -> SourceLocation {
        match self.instance {
            Instance::Field { entity, field } => {
                model.entities()[entity].fields[field].location.clone()
            }
            Instance::File { document } => SourceLocation::file(&model.documents()[document].path),
            Instance::Project => SourceLocation::file(PROJECT_PATH),
        }
    }

    fn fault(&self, model: &ProjectModel, fault: RuleFault) -> Vec<Violation> {
        log::warn!("{fault}");
        let violation = fault.to_violation(&self.location(model));
        match self.instance {
            Instance::Field { .. } => vec![violation.with_entity(self.describe(model))],
            Instance::File { .. } | Instance::Project => vec![violation],
        }
    }
}

/// Runs a registry's rules against a model.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    registry: RuleRegistry,
    options: EngineOptions,
}

impl RuleEngine {
    pub fn new(registry: RuleRegistry, options: EngineOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Evaluate every rule and return the findings in canonical order.
    ///
    /// Never fails: faulting rule instances are reported as violations.
    pub async fn run(&self, model: Arc<ProjectModel>) -> Vec<Violation> {
        let tasks = self.plan(&model);
        log::debug!(
            "Running {} rule instances ({} rules, concurrency {})",
            tasks.len(),
            self.registry.len(),
            self.options.max_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrency.max(1)));
        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let semaphore = Arc::clone(&semaphore);
            let model = Arc::clone(&model);
            let timeout = self.options.timeout;
            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return Vec::new();
                };
                run_task(task, model, timeout).await
            });
            handles.push(handle);
        }

        // Awaiting in spawn order keeps collection independent of completion order.
        let mut violations = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(found) => violations.extend(found),
                Err(e) => log::warn!("Rule task join error: {e}"),
            }
        }

        let mut violations = apply_severity_overrides(violations, &self.options.severity_overrides);
        sort_violations(&mut violations, &model.document_paths());
        violations
    }

    /// Every rule × instance pair, rules in registration order.
    fn plan(&self, model: &ProjectModel) -> Vec<Task> {
        let fields: Vec<Instance> = model
            .entities()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind() == EntityKind::View && !e.extension_required)
            .flat_map(|(id, e)| {
                (0..e.fields.len()).map(move |field| Instance::Field { entity: id, field })
            })
            .collect();
        let files: Vec<Instance> = (0..model.documents().len())
            .map(|document| Instance::File { document })
            .collect();

        let mut tasks = Vec::new();
        for rule in self.registry.iter() {
            let instances: &[Instance] = match rule {
                Rule::Field(_) => &fields,
                Rule::File(_) => &files,
                Rule::Project(_) => &[Instance::Project],
            };
            tasks.extend(instances.iter().map(|&instance| Task {
                rule: rule.clone(),
                instance,
            }));
        }
        tasks
    }
}

async fn run_task(task: Task, model: Arc<ProjectModel>, timeout: Duration) -> Vec<Violation> {
    let worker = {
        let task = task.clone();
        let model = Arc::clone(&model);
        tokio::task::spawn_blocking(move || task.run(&model))
    };
    // A timed-out worker keeps its blocking thread until the rule returns;
    // only its result is discarded.
    match tokio::time::timeout(timeout, worker).await {
        Ok(Ok(violations)) => violations,
        Ok(Err(e)) => {
            let fault = RuleFault::Panicked {
                rule: task.rule.id().to_string(),
                instance: task.describe(&model),
                message: join_error_message(e),
            };
            task.fault(&model, fault)
        }
        Err(_) => {
            let fault = RuleFault::TimedOut {
                rule: task.rule.id().to_string(),
                instance: task.describe(&model),
                timeout,
            };
            task.fault(&model, fault)
        }
    }
}

pub(crate) fn join_error_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    panic_message(error.into_panic())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
