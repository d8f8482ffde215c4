//! Ordered collection of the rules a run evaluates.

use crate::builtin;
use crate::error::{RulesError, RulesResult};
use crate::rule::{Rule, RuleInfo};
use lkml_core::{LintConfig, RuleOptions};

/// Rules in registration order.
///
/// Output ordering never depends on this order; it only fixes the order
/// rule tasks are spawned in.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in rule with default options.
    pub fn with_defaults() -> Self {
        Self {
            rules: builtin::default_rules(),
        }
    }

    /// Built-in rules configured from `config`: rules set to `off` are
    /// left out and rule options are applied.
    ///
    /// Fails on rule ids the registry does not know and on unusable
    /// options.
    pub fn from_config(config: &LintConfig) -> RulesResult<Self> {
        let mut registry = Self {
            rules: builtin::configured_rules(&config.options)?,
        };
        for id in config.rules.keys() {
            registry.check_known(id)?;
        }
        let available = registry.len();
        registry.rules.retain(|rule| config.is_enabled(rule.id()));
        log::debug!(
            "Configured {} rules ({} disabled)",
            registry.len(),
            available - registry.len()
        );
        Ok(registry)
    }

    /// Built-in rules with the given options and nothing disabled.
    pub fn with_options(options: &RuleOptions) -> RulesResult<Self> {
        Ok(Self {
            rules: builtin::configured_rules(options)?,
        })
    }

    /// Add a rule; ids must be unique and non-empty.
    pub fn register(&mut self, rule: Rule) -> RulesResult<()> {
        let id = rule.id();
        if id.is_empty() {
            return Err(RulesError::InvalidOption {
                rule: String::new(),
                message: "rule id must not be empty".to_string(),
            });
        }
        if self.get(id).is_some() {
            return Err(RulesError::DuplicateRule { id: id.to_string() });
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Keep only the listed rules (the `--rule` selection).
    pub fn select(&mut self, ids: &[String]) -> RulesResult<()> {
        for id in ids {
            self.check_known(id)?;
        }
        self.rules.retain(|rule| ids.iter().any(|id| id == rule.id()));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(Rule::id).collect()
    }

    /// Id, scope, default severity and description of every rule.
    pub fn describe(&self) -> Vec<RuleInfo> {
        self.rules.iter().map(Rule::info).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn check_known(&self, id: &str) -> RulesResult<()> {
        if self.get(id).is_some() {
            return Ok(());
        }
        Err(RulesError::UnknownRule {
            id: id.to_string(),
            known: self.rule_ids().join(", "),
        })
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
