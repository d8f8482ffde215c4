//! Lint command implementation

use anyhow::{Context, Result};
use lkml_core::{Severity, Violation};
use lkml_rules::{lint, EngineOptions, RuleRegistry};
use std::path::Path;
use std::time::Duration;

use crate::cli::{GlobalArgs, LintArgs, OutputFormat};
use crate::commands::common::{self, ExitCode};
use crate::discovery::Discovery;
use crate::output::{render_json, render_text, Summary};

/// Execute the lint command.
///
/// Exits with code 1 when any error-severity violation is found.
pub(crate) async fn execute(args: &LintArgs, global: &GlobalArgs) -> Result<()> {
    let path = Path::new(&args.path);
    let config = common::load_config(global, common::project_dir(path))?;

    let mut registry =
        RuleRegistry::from_config(&config).context("Invalid rule configuration")?;
    if !args.rules.is_empty() {
        registry
            .select(&args.rules)
            .context("Invalid --rule selection")?;
    }

    let mut options = EngineOptions::from_config(&config);
    if let Some(secs) = args.timeout {
        if secs == 0 {
            anyhow::bail!("--timeout must be greater than zero");
        }
        options.timeout = Duration::from_secs(secs);
    }
    if let Some(threads) = args.threads {
        options.max_concurrency = threads.max(1);
    }

    let discovery = Discovery::run(path, &config.exclude)?;
    for (file, pattern) in &discovery.unmatched_includes {
        eprintln!("[warn] {file}: include \"{pattern}\" matches no files");
    }
    let sources = discovery.load();

    if global.verbose {
        eprintln!(
            "[verbose] Linting {} files with {} rules (timeout {}s, {} threads)",
            sources.len(),
            registry.len(),
            options.timeout.as_secs(),
            options.max_concurrency
        );
    }

    let report = lint(sources, &registry, options).await;

    let min_severity: Severity = args.min_severity.into();
    let shown: Vec<&Violation> = report
        .violations
        .iter()
        .filter(|v| v.severity >= min_severity)
        .collect();
    let summary = Summary::new(&report, &shown);

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&shown, &summary)),
        OutputFormat::Json => println!("{}", render_json(&shown, &summary)?),
    }

    if report.has_errors() {
        return Err(ExitCode(1).into());
    }
    Ok(())
}
