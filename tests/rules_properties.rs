//! Integration tests for the property- and pattern-based rules.

use flowscan::config::ScanConfig;
use flowscan::parse::{Flow, parse_source, parse_tree};
use flowscan::result::RuleResult;
use flowscan::scan::scan;
use serde_json::json;

fn fixture(name: &str, xml: &str) -> Flow {
    parse_source(name, xml).expect("fixture parses")
}

fn isolated(rule_name: &str) -> ScanConfig {
    serde_json::from_str(&format!(
        r#"{{"ruleMode": "isolated", "rules": {{"{rule_name}": {{}}}}}}"#
    ))
    .unwrap()
}

fn single_result(flow: Flow, rule_name: &str) -> RuleResult {
    let mut results = scan(vec![flow], &isolated(rule_name));
    let result = results.remove(0);
    assert_eq!(result.rule_results.len(), 1, "rule did not run");
    result.rule_results.into_iter().next().unwrap()
}

#[test]
fn record_trigger_without_filters_or_scheduled_paths_is_flagged() {
    let flow = fixture(
        "Missing_Trigger_Filter.flow-meta.xml",
        include_str!("fixtures/Missing_Trigger_Filter.flow-meta.xml"),
    );
    let result = single_result(flow, "MissingFilterRecordTrigger");
    assert!(result.occurs);
    assert_eq!(result.details[0].name, "RecordAfterSave");
}

#[test]
fn record_trigger_with_filters_passes() {
    let flow = fixture(
        "Missing_Fault_Path.flow-meta.xml",
        include_str!("fixtures/Missing_Fault_Path.flow-meta.xml"),
    );
    let result = single_result(flow, "MissingFilterRecordTrigger");
    assert!(!result.occurs);
}

#[test]
fn scheduled_paths_count_as_entry_conditions() {
    // no filters, but the scheduled path carries its own conditions
    let flow = parse_tree(
        "Async_Only.flow-meta.xml",
        json!({"Flow": {
            "processType": "AutoLaunchedFlow",
            "start": {
                "object": "Account",
                "triggerType": "RecordAfterSave",
                "scheduledPaths": [{"connector": {"targetReference": "notify"}}],
            },
            "actionCalls": {"name": "notify"},
        }}),
    );
    let result = single_result(flow, "MissingFilterRecordTrigger");
    assert!(!result.occurs);
}

#[test]
fn record_triggered_flow_without_trigger_order_is_flagged() {
    let flow = fixture(
        "Missing_Trigger_Filter.flow-meta.xml",
        include_str!("fixtures/Missing_Trigger_Filter.flow-meta.xml"),
    );
    let result = single_result(flow, "TriggerOrder");
    assert!(result.occurs);
}

#[test]
fn trigger_order_present_passes() {
    let flow = fixture(
        "Missing_Fault_Path.flow-meta.xml",
        include_str!("fixtures/Missing_Fault_Path.flow-meta.xml"),
    );
    let result = single_result(flow, "TriggerOrder");
    assert!(!result.occurs);
}

#[test]
fn string_record_id_input_variable_is_flagged() {
    let flow = fixture(
        "Record_Id_String.flow-meta.xml",
        include_str!("fixtures/Record_Id_String.flow-meta.xml"),
    );
    let result = single_result(flow, "RecordIdAsString");
    assert!(result.occurs);
    assert_eq!(result.details[0].name, "recordId");
    assert_eq!(
        result.details[0].details.as_ref().unwrap()["dataType"],
        "String"
    );
}

#[test]
fn record_triggered_flows_are_exempt_from_record_id_check() {
    // record-triggered flows receive the record implicitly, so an input
    // variable named recordId cannot be the screen-flow anti-pattern
    let flow = parse_tree(
        "Trigger_WithVar.flow-meta.xml",
        json!({"Flow": {
            "processType": "AutoLaunchedFlow",
            "start": {
                "object": "Account",
                "triggerType": "RecordAfterSave",
                "connector": {"targetReference": "noop"},
            },
            "assignments": {"name": "noop"},
            "variables": {"name": "recordId", "dataType": "String", "isInput": "true"},
        }}),
    );
    let result = single_result(flow, "RecordIdAsString");
    assert!(!result.occurs);
}

#[test]
fn loop_into_assignment_suggests_transform() {
    let flow = fixture(
        "Transform_Candidate.flow-meta.xml",
        include_str!("fixtures/Transform_Candidate.flow-meta.xml"),
    );
    let result = single_result(flow, "TransformInsteadOfLoop");
    assert!(result.occurs);
    assert_eq!(result.details[0].name, "each_item");
    assert_eq!(
        result.details[0].details.as_ref().unwrap()["connectsTo"],
        "build_list"
    );
}

#[test]
fn loop_into_non_assignment_passes() {
    let flow = fixture(
        "Cyclic_Loop.flow-meta.xml",
        include_str!("fixtures/Cyclic_Loop.flow-meta.xml"),
    );
    let result = single_result(flow, "TransformInsteadOfLoop");
    assert!(!result.occurs);
}

#[test]
fn draft_flow_is_inactive() {
    let flow = fixture(
        "Legacy_Start.flow-meta.xml",
        include_str!("fixtures/Legacy_Start.flow-meta.xml"),
    );
    let result = single_result(flow, "InactiveFlow");
    assert!(result.occurs);
}

#[test]
fn missing_description_is_flagged() {
    let flow = fixture(
        "Legacy_Start.flow-meta.xml",
        include_str!("fixtures/Legacy_Start.flow-meta.xml"),
    );
    let result = single_result(flow, "FlowDescription");
    assert!(result.occurs);
}

#[test]
fn free_form_canvas_is_flagged() {
    let flow = parse_tree(
        "Free_Form.flow-meta.xml",
        json!({"Flow": {
            "processMetadataValues": [
                {"name": "CanvasMode", "value": {"stringValue": "FREE_FORM_CANVAS"}},
            ],
        }}),
    );
    let result = single_result(flow, "AutoLayout");
    assert!(result.occurs);

    let flow = fixture(
        "Service_OrderFulfillment.flow-meta.xml",
        include_str!("fixtures/Service_OrderFulfillment.flow-meta.xml"),
    );
    let result = single_result(flow, "AutoLayout");
    assert!(!result.occurs);
}

#[test]
fn system_mode_without_sharing_is_flagged_under_betamode() {
    let flow = parse_tree(
        "System_Mode.flow-meta.xml",
        json!({"Flow": {
            "runInMode": "SystemModeWithoutSharing",
            "processType": "AutoLaunchedFlow",
        }}),
    );
    let config: ScanConfig = serde_json::from_str(r#"{"betamode": true}"#).unwrap();
    let results = scan(vec![flow], &config);
    let result = results[0]
        .rule_results
        .iter()
        .find(|r| r.rule_name == "UnsafeRunningContext")
        .expect("beta rule selected");
    assert!(result.occurs);
}

#[test]
fn missing_api_version_is_flagged() {
    let flow = parse_tree("No_Version.flow-meta.xml", json!({"Flow": {"label": "x"}}));
    let result = single_result(flow, "APIVersion");
    assert!(result.occurs);
    assert_eq!(result.details[0].name, "apiVersion");
}
