//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use lkml_core::Severity;

/// lkml-lint - static checks for LookML projects
#[derive(Parser, Debug)]
#[command(name = "lkml-lint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: lkml-lint.yml in the project root)
    #[arg(short, long, global = true, env = "LKML_LINT_CONFIG")]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lint a LookML project
    Lint(LintArgs),

    /// List the available rules
    Rules(RulesArgs),
}

/// Arguments for the lint command
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Project directory or single file to lint
    #[arg(default_value = ".")]
    pub path: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Only run these rules (repeatable)
    #[arg(short, long = "rule", value_name = "ID")]
    pub rules: Vec<String>,

    /// Hide violations below this severity
    #[arg(long, value_enum, default_value = "info")]
    pub min_severity: SeverityArg,

    /// Per rule-instance timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum concurrently running rule instances (overrides config)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

/// Arguments for the rules command
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Report formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines and summary
    Text,
    /// JSON document
    Json,
}

/// Severity filter values
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityArg {
    Info,
    Warning,
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(value: SeverityArg) -> Self {
        match value {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
        }
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
