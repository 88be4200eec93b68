//! Scan orchestrator: runs every selected, applicable rule against every
//! parsed flow and assembles per-flow results.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::config::ScanConfig;
use crate::parse::types::Flow;
use crate::parse::xml::{iter_entries, value_str};
use crate::result::{RuleResult, ScanResult};
use crate::rules::store::select_rules;

/// Scan a batch of flows under a resolved configuration.
///
/// Each flow gets one `RuleResult` per selected rule whose supported types
/// include the flow's process type, non-occurring results included, so
/// consumers always see which rules ran. Rules read the flow without
/// mutating it, so nothing here needs coordination if a host chooses to
/// parallelize per flow.
pub fn scan(flows: Vec<Flow>, config: &ScanConfig) -> Vec<ScanResult> {
    let rules = select_rules(config);

    flows
        .into_iter()
        .map(|flow| {
            let suppressions = collect_suppressions(&flow, config);
            let empty = Vec::new();

            let mut rule_results = Vec::new();
            for rule in &rules {
                if !rule.supports(&flow.process_type) {
                    continue;
                }
                let rule_suppressions = suppressions.get(rule.name()).unwrap_or(&empty);

                // a faulting rule loses its own result, never the scan
                let result =
                    catch_unwind(AssertUnwindSafe(|| rule.execute(&flow, rule_suppressions)));
                rule_results.push(match result {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::error!(
                            rule = rule.name(),
                            flow = flow.name.as_str(),
                            "rule execution faulted; recording and continuing"
                        );
                        RuleResult::failed(rule.name(), rule.severity, "rule execution faulted")
                    }
                });
            }

            ScanResult { flow, rule_results }
        })
        .collect()
}

/// Per-rule suppression lists for one flow: configured exceptions merged with
/// in-flow `SuppressRule` metadata entries.
///
/// Metadata values take the form `RuleName:ElementName`, `RuleName:*`, or a
/// bare `RuleName` (equivalent to `*`).
fn collect_suppressions(flow: &Flow, config: &ScanConfig) -> HashMap<String, Vec<String>> {
    let mut suppressions: HashMap<String, Vec<String>> = HashMap::new();

    if let Some(per_rule) = config.exceptions.get(&flow.name) {
        for (rule_name, elements) in per_rule {
            suppressions
                .entry(rule_name.clone())
                .or_default()
                .extend(elements.iter().cloned());
        }
    }

    for entry in iter_entries(flow.attribute("processMetadataValues")) {
        let is_suppression = entry
            .get("name")
            .and_then(value_str)
            .is_some_and(|n| n == "SuppressRule");
        if !is_suppression {
            continue;
        }
        let Some(value) = entry
            .get("value")
            .and_then(|v| v.get("stringValue"))
            .and_then(value_str)
        else {
            continue;
        };

        let (rule_name, element) = match value.split_once(':') {
            Some((rule, element)) => (rule.to_string(), element.to_string()),
            None => (value, "*".to_string()),
        };
        suppressions.entry(rule_name).or_default().push(element);
    }

    suppressions
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_suppressions_are_collected() {
        let flow = Flow::parse(
            "s.flow-meta.xml",
            json!({"Flow": {"processMetadataValues": [
                {"name": "SuppressRule", "value": {"stringValue": "MissingFaultPath:create_task"}},
                {"name": "SuppressRule", "value": {"stringValue": "UnconnectedElement"}},
                {"name": "BuilderType", "value": {"stringValue": "LightningFlowBuilder"}},
            ]}}),
        );
        let suppressions = collect_suppressions(&flow, &ScanConfig::default());
        assert_eq!(suppressions["MissingFaultPath"], vec!["create_task"]);
        assert_eq!(suppressions["UnconnectedElement"], vec!["*"]);
        assert_eq!(suppressions.len(), 2);
    }

    #[test]
    fn config_exceptions_merge_with_metadata() {
        let flow = Flow::parse("s.flow-meta.xml", json!({"Flow": {}}));
        let config: ScanConfig = serde_json::from_value(json!({
            "exceptions": {"s": {"FlowDescription": ["*"]}}
        }))
        .unwrap();
        let suppressions = collect_suppressions(&flow, &config);
        assert_eq!(suppressions["FlowDescription"], vec!["*"]);
    }
}
