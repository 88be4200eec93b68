//! Resolved scan configuration.
//!
//! The core trusts this shape as already merged: config-file discovery,
//! environment/CLI override precedence, and schema validation all happen in
//! the host layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// How the configured rule map combines with the built-in catalogs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuleMode {
    /// Full default catalog with per-rule overrides applied on top.
    #[default]
    Merged,
    /// Only explicitly configured rules run.
    Isolated,
}

impl<'de> Deserialize<'de> for RuleMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "isolated" => RuleMode::Isolated,
            "merged" => RuleMode::Merged,
            other => {
                // invalid mode degrades to the default rather than failing
                tracing::warn!(mode = other, "unrecognized ruleMode, using merged");
                RuleMode::Merged
            }
        })
    }
}

/// Per-rule configuration entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleSettings {
    /// `Some(false)` skips the rule entirely.
    pub enabled: Option<bool>,
    /// Severity override; invalid strings keep the rule's default.
    pub severity: Option<String>,
    /// Everything else is handed to the rule as its options.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// The fully merged configuration one scan runs under.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub rules: BTreeMap<String, RuleSettings>,
    pub betamode: bool,
    #[serde(rename = "ruleMode")]
    pub rule_mode: RuleMode,
    /// flow name → rule name → suppressed element names (`"*"` suppresses
    /// the whole rule for that flow).
    pub exceptions: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}
