//! Configuration types and parsing for lkml-lint.yml

use crate::error::{CoreError, CoreResult};
use crate::violation::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Config file names looked up in a project root, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["lkml-lint.yml", "lkml-lint.yaml"];

/// Main lint configuration from lkml-lint.yml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LintConfig {
    /// Per-rule severity: `off` disables the rule, any level overrides
    /// the rule's default severity.
    #[serde(default)]
    pub rules: BTreeMap<String, ConfigSeverity>,

    /// Options for individual rules
    #[serde(default)]
    pub options: RuleOptions,

    /// Rule engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Glob patterns (relative to the project root) skipped during discovery
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Severity level used in the `rules` map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSeverity {
    /// Informational: no action required
    Info,
    /// Warning: potential issue worth reviewing
    Warning,
    /// Error: convention broken
    Error,
    /// Disabled: the rule does not run
    Off,
}

impl ConfigSeverity {
    /// The severity this maps to, or `None` for `off`.
    pub fn level(self) -> Option<Severity> {
        match self {
            ConfigSeverity::Info => Some(Severity::Info),
            ConfigSeverity::Warning => Some(Severity::Warning),
            ConfigSeverity::Error => Some(Severity::Error),
            ConfigSeverity::Off => None,
        }
    }
}

/// Options consumed by configurable rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleOptions {
    #[serde(default)]
    pub field_naming: FieldNamingOptions,
    #[serde(default)]
    pub yesno_name: YesNoNameOptions,
    #[serde(default)]
    pub lexicon: LexiconOptions,
}

/// Options for the `field_naming` rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldNamingOptions {
    /// Regex every field name must match
    #[serde(default = "default_field_pattern")]
    pub pattern: String,
}

impl Default for FieldNamingOptions {
    fn default() -> Self {
        Self {
            pattern: default_field_pattern(),
        }
    }
}

/// Options for the `yesno_name` rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YesNoNameOptions {
    /// Accepted name prefixes for `type: yesno` dimensions
    #[serde(default = "default_yesno_prefixes")]
    pub prefixes: Vec<String>,
}

impl Default for YesNoNameOptions {
    fn default() -> Self {
        Self {
            prefixes: default_yesno_prefixes(),
        }
    }
}

/// Options for the `lexicon` rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LexiconOptions {
    /// Phrases that must not appear in field names, labels or descriptions
    /// (matched case-insensitively)
    #[serde(default = "default_forbidden_phrases")]
    pub forbidden: Vec<String>,
}

impl Default for LexiconOptions {
    fn default() -> Self {
        Self {
            forbidden: default_forbidden_phrases(),
        }
    }
}

/// Rule engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Per rule-instance timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum concurrently running rule instances (default: available cores)
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            threads: None,
        }
    }
}

fn default_field_pattern() -> String {
    "^[a-z][a-z0-9_]*$".to_string()
}

fn default_yesno_prefixes() -> Vec<String> {
    vec!["is_".to_string(), "has_".to_string()]
}

fn default_forbidden_phrases() -> Vec<String> {
    vec!["TODO".to_string(), "FIXME".to_string(), "TBD".to_string()]
}

fn default_timeout_secs() -> u64 {
    30
}

impl LintConfig {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_yaml(&content)?;
        log::debug!("Loaded lint config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        // An empty file is a valid, default configuration
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: LintConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory, falling back to the
    /// defaults when no config file exists.
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    /// Configured severity for a rule, if any.
    pub fn severity_for(&self, rule_id: &str) -> Option<ConfigSeverity> {
        self.rules.get(rule_id).copied()
    }

    /// Returns true unless the rule is configured `off`.
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        self.severity_for(rule_id) != Some(ConfigSeverity::Off)
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.engine.timeout_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "engine.timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.engine.threads == Some(0) {
            return Err(CoreError::ConfigInvalid {
                message: "engine.threads must be greater than zero".to_string(),
            });
        }
        if self.options.field_naming.pattern.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "options.field_naming.pattern cannot be empty".to_string(),
            });
        }
        if let Some(id) = self.rules.keys().find(|k| k.is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: format!("empty rule id in `rules`: '{id}'"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
