//! End-to-end lint run: parse, build the model, evaluate rules.

use crate::engine::{join_error_message, EngineOptions, RuleEngine};
use crate::registry::RuleRegistry;
use lkml_core::{sort_violations, Document, RuleId, Severity, Violation, ViolationOrigin};
use lkml_model::build_project;
use lkml_parser::{parse_document, ParseResult, PARSE_ERROR_RULE};
use serde::Serialize;
use std::sync::Arc;

/// Raw text of one file, as supplied by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub path: String,
    pub text: String,
}

impl SourceText {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Everything a lint run found.
#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    /// Findings in canonical order
    pub violations: Vec<Violation>,
    /// Files that parsed
    pub documents: usize,
    /// Views and explores in the model
    pub entities: usize,
    /// Rules evaluated
    pub rules: usize,
}

impl LintReport {
    /// Returns true if any violation has error severity.
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(Violation::is_error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }
}

/// Parse every source on the blocking pool.
///
/// Documents come back in input order. A file that fails to parse, or
/// whose parse task dies, is skipped and reported as a `parse_error`
/// violation.
pub async fn parse_documents(sources: Vec<SourceText>) -> (Vec<Document>, Vec<Violation>) {
    parse_with(sources, |source| parse_document(&source.path, &source.text)).await
}

pub(crate) async fn parse_with<F>(
    sources: Vec<SourceText>,
    parse: F,
) -> (Vec<Document>, Vec<Violation>)
where
    F: Fn(&SourceText) -> ParseResult<Document> + Send + Sync + 'static,
{
    let parse = Arc::new(parse);
    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let parse = Arc::clone(&parse);
            let path = source.path.clone();
            (path, tokio::task::spawn_blocking(move || parse(&source)))
        })
        .collect();

    let mut documents = Vec::new();
    let mut violations = Vec::new();
    for (path, handle) in handles {
        match handle.await {
            Ok(Ok(document)) => documents.push(document),
            Ok(Err(e)) => {
                log::debug!("{e}");
                violations.push(e.to_violation());
            }
            Err(e) => {
                let message = join_error_message(e);
                log::warn!("Parse task for {path} failed: {message}");
                violations.push(
                    Violation::for_file(
                        &RuleId::new(PARSE_ERROR_RULE),
                        Severity::Error,
                        format!("parser failed: {message}"),
                        path,
                    )
                    .with_origin(ViolationOrigin::Parse),
                );
            }
        }
    }
    log::debug!(
        "Parsed {} documents ({} failed)",
        documents.len(),
        violations.len()
    );
    (documents, violations)
}

/// Lint a set of sources with the given rules.
pub async fn lint(
    sources: Vec<SourceText>,
    registry: &RuleRegistry,
    options: EngineOptions,
) -> LintReport {
    let path_order: Vec<String> = sources.iter().map(|s| s.path.clone()).collect();

    let (documents, mut violations) = parse_documents(sources).await;
    let document_count = documents.len();

    let outcome = build_project(documents);
    log::debug!(
        "Built model with {} entities ({} resolution findings)",
        outcome.model.entity_count(),
        outcome.violations.len()
    );
    violations.extend(outcome.violations);
    let model = Arc::new(outcome.model);

    let engine = RuleEngine::new(registry.clone(), options);
    violations.extend(engine.run(Arc::clone(&model)).await);

    sort_violations(&mut violations, &path_order);
    LintReport {
        violations,
        documents: document_count,
        entities: model.entity_count(),
        rules: registry.len(),
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
