//! Static rule registry and configuration resolver.
//!
//! Rules are selected by configured name through a name → constructor match,
//! populated at compile time. No reflection: an unknown name is a resolver
//! error the caller decides how to handle.

use super::{
    ApiVersion, AutoLayout, CyclomaticComplexity, DmlStatementInLoop, FlowDescription, FlowName,
    InactiveFlow, MissingFaultPath, MissingFilterRecordTrigger, RecordIdAsString, Rule,
    RuleDefinition, SoqlQueryInLoop, TransformInsteadOfLoop, TriggerOrder, UnconnectedElement,
    UnsafeRunningContext,
};
use crate::config::{RuleMode, RuleSettings, ScanConfig};
use crate::error::ScanError;
use crate::result::Severity;

/// Names in the default catalog, in registry order.
pub const DEFAULT_RULE_NAMES: &[&str] = &[
    "APIVersion",
    "AutoLayout",
    "CyclomaticComplexity",
    "DMLStatementInLoop",
    "FlowDescription",
    "FlowName",
    "InactiveFlow",
    "MissingFaultPath",
    "MissingFilterRecordTrigger",
    "RecordIdAsString",
    "SOQLQueryInLoop",
    "TransformInsteadOfLoop",
    "TriggerOrder",
    "UnconnectedElement",
];

/// Names enabled only when beta mode is on.
pub const BETA_RULE_NAMES: &[&str] = &["UnsafeRunningContext"];

/// Construct a rule implementation from its configured name.
pub fn instantiate(name: &str) -> Result<Box<dyn Rule>, ScanError> {
    match name {
        "APIVersion" => Ok(Box::new(ApiVersion::new())),
        "AutoLayout" => Ok(Box::new(AutoLayout::new())),
        "CyclomaticComplexity" => Ok(Box::new(CyclomaticComplexity::new())),
        "DMLStatementInLoop" => Ok(Box::new(DmlStatementInLoop::new())),
        "FlowDescription" => Ok(Box::new(FlowDescription::new())),
        "FlowName" => Ok(Box::new(FlowName::new())),
        "InactiveFlow" => Ok(Box::new(InactiveFlow::new())),
        "MissingFaultPath" => Ok(Box::new(MissingFaultPath::new())),
        "MissingFilterRecordTrigger" => Ok(Box::new(MissingFilterRecordTrigger::new())),
        "RecordIdAsString" => Ok(Box::new(RecordIdAsString::new())),
        "SOQLQueryInLoop" => Ok(Box::new(SoqlQueryInLoop::new())),
        "TransformInsteadOfLoop" => Ok(Box::new(TransformInsteadOfLoop::new())),
        "TriggerOrder" => Ok(Box::new(TriggerOrder::new())),
        "UnconnectedElement" => Ok(Box::new(UnconnectedElement::new())),
        "UnsafeRunningContext" => Ok(Box::new(UnsafeRunningContext::new())),
        _ => Err(ScanError::UnknownRule(name.to_string())),
    }
}

/// Resolve the set of rules one scan runs, from the catalogs and the user
/// configuration.
///
/// In isolated mode only configured names instantiate; in merged mode (the
/// default) the full default catalog runs, extended by the beta catalog when
/// beta mode is on, with per-rule overrides applied on top. One bad entry
/// never aborts the resolution.
pub fn select_rules(config: &ScanConfig) -> Vec<RuleDefinition> {
    let mut selected = Vec::new();

    match config.rule_mode {
        RuleMode::Isolated => {
            for (name, settings) in &config.rules {
                if settings.enabled == Some(false) {
                    continue;
                }
                match instantiate(name) {
                    Ok(rule) => selected.push(configured(rule, Some(settings))),
                    Err(e) => {
                        tracing::warn!(rule = name.as_str(), error = %e, "skipping unresolvable rule");
                    }
                }
            }
        }
        RuleMode::Merged => {
            let mut names: Vec<&str> = DEFAULT_RULE_NAMES.to_vec();
            if config.betamode {
                names.extend(BETA_RULE_NAMES);
            }
            for name in names {
                let settings = config.rules.get(name);
                if settings.and_then(|s| s.enabled) == Some(false) {
                    continue;
                }
                match instantiate(name) {
                    Ok(rule) => selected.push(configured(rule, settings)),
                    Err(e) => {
                        tracing::warn!(rule = name, error = %e, "skipping unresolvable rule");
                    }
                }
            }
            // config names outside the catalogs have nothing to merge into
        }
    }

    selected
}

fn configured(rule: Box<dyn Rule>, settings: Option<&RuleSettings>) -> RuleDefinition {
    let mut definition = RuleDefinition::new(rule);
    let Some(settings) = settings else {
        return definition;
    };

    if let Some(raw) = &settings.severity {
        match raw.parse::<Severity>() {
            Ok(severity) => definition.severity = severity,
            Err(()) => {
                tracing::warn!(
                    rule = definition.name(),
                    severity = raw.as_str(),
                    "invalid severity override, keeping default"
                );
            }
        }
    }

    if !settings.options.is_empty() {
        definition.options = Some(settings.options.clone());
    }

    definition
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_name_instantiates() {
        for name in DEFAULT_RULE_NAMES.iter().chain(BETA_RULE_NAMES) {
            let rule = instantiate(name).unwrap();
            assert_eq!(rule.info().name, *name);
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert!(instantiate("NotARule").is_err());
    }

    #[test]
    fn merged_mode_includes_beta_only_when_flagged() {
        let config = ScanConfig::default();
        let names: Vec<&str> = select_rules(&config).iter().map(|d| d.name()).collect();
        assert_eq!(names.len(), DEFAULT_RULE_NAMES.len());
        assert!(!names.contains(&"UnsafeRunningContext"));

        let config = ScanConfig {
            betamode: true,
            ..ScanConfig::default()
        };
        let names: Vec<&str> = select_rules(&config).iter().map(|d| d.name()).collect();
        assert!(names.contains(&"UnsafeRunningContext"));
    }

    #[test]
    fn invalid_severity_override_keeps_default() {
        let config: ScanConfig = serde_json::from_str(
            r#"{"rules": {"TriggerOrder": {"severity": "blocker"}}}"#,
        )
        .unwrap();
        let rules = select_rules(&config);
        let trigger_order = rules.iter().find(|d| d.name() == "TriggerOrder").unwrap();
        assert_eq!(trigger_order.severity, Severity::Note);
    }
}
