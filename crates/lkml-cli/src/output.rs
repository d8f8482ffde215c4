//! Rendering of lint reports.

use anyhow::{Context, Result};
use lkml_core::{Severity, Violation};
use lkml_rules::LintReport;
use serde::Serialize;

/// Counts shown under the findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Summary {
    pub files: usize,
    pub entities: usize,
    pub rules: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl Summary {
    pub(crate) fn new(report: &LintReport, shown: &[&Violation]) -> Self {
        let count = |s: Severity| shown.iter().filter(|v| v.severity == s).count();
        Self {
            files: report.documents,
            entities: report.entities,
            rules: report.rules,
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            info: count(Severity::Info),
        }
    }

    fn total(&self) -> usize {
        self.errors + self.warnings + self.info
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    violations: &'a [&'a Violation],
    summary: &'a Summary,
}

/// One line per violation followed by a summary line.
pub(crate) fn render_text(violations: &[&Violation], summary: &Summary) -> String {
    let mut out = String::new();
    for violation in violations {
        out.push_str(&violation.to_string());
        out.push('\n');
        if let Some(entity) = &violation.entity {
            out.push_str(&format!("    in {entity}\n"));
        }
    }
    if !violations.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!(
        "{} violations ({} errors, {} warnings, {} info) in {} files, {} rules checked\n",
        summary.total(),
        summary.errors,
        summary.warnings,
        summary.info,
        summary.files,
        summary.rules
    ));
    out
}

pub(crate) fn render_json(violations: &[&Violation], summary: &Summary) -> Result<String> {
    let report = JsonReport {
        violations,
        summary,
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize lint report")
}

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;
