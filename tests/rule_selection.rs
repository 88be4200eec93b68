//! Integration tests for the configuration resolver's two modes.

use flowscan::config::ScanConfig;
use flowscan::result::Severity;
use flowscan::rules::store::{DEFAULT_RULE_NAMES, select_rules};

fn config(json: &str) -> ScanConfig {
    serde_json::from_str(json).expect("config parses")
}

#[test]
fn isolated_mode_returns_exactly_the_configured_set() {
    let rules = select_rules(&config(
        r#"{"ruleMode": "isolated", "rules": {"MissingFaultPath": {}}}"#,
    ));
    let names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["MissingFaultPath"]);
}

#[test]
fn isolated_mode_skips_disabled_rules() {
    let rules = select_rules(&config(
        r#"{"ruleMode": "isolated", "rules": {
            "MissingFaultPath": {"enabled": false, "severity": "error"},
            "UnconnectedElement": {"enabled": true}
        }}"#,
    ));
    let names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["UnconnectedElement"]);
}

#[test]
fn isolated_mode_skips_unknown_names_without_aborting() {
    let rules = select_rules(&config(
        r#"{"ruleMode": "isolated", "rules": {
            "NoSuchRule": {},
            "TriggerOrder": {}
        }}"#,
    ));
    let names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["TriggerOrder"]);
}

#[test]
fn merged_mode_runs_the_full_catalog_minus_disabled() {
    let rules = select_rules(&config(
        r#"{"ruleMode": "merged", "rules": {"FlowDescription": {"enabled": false}}}"#,
    ));
    let names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
    assert_eq!(names.len(), DEFAULT_RULE_NAMES.len() - 1);
    assert!(!names.contains(&"FlowDescription"));
    assert!(names.contains(&"UnconnectedElement"));
}

#[test]
fn merged_mode_ignores_names_outside_the_catalogs() {
    let rules = select_rules(&config(r#"{"rules": {"NoSuchRule": {"severity": "error"}}}"#));
    assert_eq!(rules.len(), DEFAULT_RULE_NAMES.len());
}

#[test]
fn beta_catalog_joins_only_under_betamode() {
    let without = select_rules(&config("{}"));
    assert!(without.iter().all(|r| r.name() != "UnsafeRunningContext"));

    let with = select_rules(&config(r#"{"betamode": true}"#));
    assert!(with.iter().any(|r| r.name() == "UnsafeRunningContext"));
}

#[test]
fn severity_override_applies_when_valid() {
    let rules = select_rules(&config(
        r#"{"rules": {"UnconnectedElement": {"severity": "warning"}}}"#,
    ));
    let rule = rules
        .iter()
        .find(|r| r.name() == "UnconnectedElement")
        .unwrap();
    assert_eq!(rule.severity, Severity::Warning);
}

#[test]
fn invalid_severity_override_keeps_the_default() {
    let rules = select_rules(&config(
        r#"{"rules": {"UnconnectedElement": {"severity": "fatal"}}}"#,
    ));
    let rule = rules
        .iter()
        .find(|r| r.name() == "UnconnectedElement")
        .unwrap();
    assert_eq!(rule.severity, Severity::Error);
}

#[test]
fn invalid_rule_mode_degrades_to_merged() {
    let rules = select_rules(&config(r#"{"ruleMode": "exclusive"}"#));
    assert_eq!(rules.len(), DEFAULT_RULE_NAMES.len());
}
