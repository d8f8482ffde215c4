//! Per-rule severity overrides from the `rules:` config section.

use lkml_core::{ConfigSeverity, Severity, Violation};
use std::collections::BTreeMap;

/// Severity a rule was overridden to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverriddenSeverity {
    /// Drop the rule's findings
    Off,
    Level(Severity),
}

/// Rule id to overridden severity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityOverrides {
    overrides: BTreeMap<String, OverriddenSeverity>,
}

impl SeverityOverrides {
    pub fn from_config(rules: &BTreeMap<String, ConfigSeverity>) -> Self {
        let overrides = rules
            .iter()
            .map(|(id, severity)| {
                let overridden = match severity.level() {
                    Some(level) => OverriddenSeverity::Level(level),
                    None => OverriddenSeverity::Off,
                };
                (id.clone(), overridden)
            })
            .collect();
        Self { overrides }
    }

    pub fn get(&self, rule_id: &str) -> Option<OverriddenSeverity> {
        self.overrides.get(rule_id).copied()
    }

    pub fn set(&mut self, rule_id: impl Into<String>, severity: OverriddenSeverity) {
        self.overrides.insert(rule_id.into(), severity);
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Apply overrides to lint findings.
///
/// Engine diagnostics (parse, resolution, rule faults) keep their severity.
pub fn apply_severity_overrides(
    violations: Vec<Violation>,
    overrides: &SeverityOverrides,
) -> Vec<Violation> {
    if overrides.is_empty() {
        return violations;
    }
    violations
        .into_iter()
        .filter_map(|v| {
            if v.origin.is_engine() {
                return Some(v);
            }
            match overrides.get(v.rule_id.as_str()) {
                None => Some(v),
                Some(OverriddenSeverity::Off) => None,
                Some(OverriddenSeverity::Level(level)) => Some(v.with_severity(level)),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "severity_test.rs"]
mod tests;
