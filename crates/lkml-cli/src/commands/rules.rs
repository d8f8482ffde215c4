//! Rules command implementation

use anyhow::{Context, Result};
use lkml_rules::{RuleInfo, RuleRegistry};

use crate::cli::{GlobalArgs, OutputFormat, RulesArgs};
use crate::commands::common::format_table;

/// Execute the rules command: list every built-in rule.
pub(crate) async fn execute(args: &RulesArgs, global: &GlobalArgs) -> Result<()> {
    let registry = RuleRegistry::with_defaults();
    let rules = registry.describe();

    if global.verbose {
        eprintln!("[verbose] {} rules registered", rules.len());
    }

    match args.format {
        OutputFormat::Text => print_rules(&rules),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&rules).context("Failed to serialize rules")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn print_rules(rules: &[RuleInfo]) {
    let rows: Vec<Vec<String>> = rules
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.scope.to_string(),
                r.severity.to_string(),
                r.description.to_string(),
            ]
        })
        .collect();
    print!(
        "{}",
        format_table(&["RULE", "SCOPE", "SEVERITY", "DESCRIPTION"], &rows)
    );
}
