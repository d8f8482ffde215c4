//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use lkml_core::LintConfig;
use std::fmt;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main.rs maps it to the process exit status.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load the lint configuration.
///
/// An explicit `--config` must exist; otherwise `lkml-lint.yml` in
/// `project_dir` is used when present.
pub(crate) fn load_config(global: &GlobalArgs, project_dir: &Path) -> Result<LintConfig> {
    match &global.config {
        Some(path) => LintConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config {path}")),
        None => LintConfig::load_or_default(project_dir)
            .with_context(|| format!("Failed to load config from {}", project_dir.display())),
    }
}

/// Directory the config file and relative paths are resolved against.
pub(crate) fn project_dir(path: &Path) -> &Path {
    if path.is_file() {
        path.parent().unwrap_or(Path::new("."))
    } else {
        path
    }
}

/// Width of each column: the longest of its header and cells.
pub(crate) fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(String::len)
                .fold(header.len(), usize::max)
        })
        .collect()
}

/// Render a left-aligned table, header first, then a dashed rule.
pub(crate) fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths = column_widths(headers, rows);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();

    let mut out = String::new();
    let lines = std::iter::once(headers.iter().map(|h| h.to_string()).collect::<Vec<_>>())
        .chain(std::iter::once(rule))
        .chain(rows.iter().cloned());
    for cells in lines {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
