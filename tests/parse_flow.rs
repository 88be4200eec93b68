//! Integration tests for the flow parser: tag classification, start
//! resolution variants, and tree round-trip.

use flowscan::parse::types::{ConnectorKind, MetaType};
use flowscan::parse::{Flow, parse_flows, parse_source};

fn service_flow() -> Flow {
    parse_source(
        "Service_OrderFulfillment.flow-meta.xml",
        include_str!("fixtures/Service_OrderFulfillment.flow-meta.xml"),
    )
    .expect("fixture parses")
}

#[test]
fn classifies_elements_into_buckets() {
    let flow = service_flow();

    assert_eq!(flow.name, "Service_OrderFulfillment");
    assert_eq!(flow.label, "Service Order Fulfillment");
    assert_eq!(flow.process_type, "AutoLaunchedFlow");
    assert_eq!(flow.status, "Active");

    assert_eq!(flow.nodes().count(), 4);
    assert_eq!(flow.variables().count(), 1);
    let metadata = flow
        .elements
        .iter()
        .filter(|e| e.meta_type() == MetaType::Metadata)
        .count();
    assert_eq!(metadata, 7);
    assert_eq!(flow.elements.len(), 12);
}

#[test]
fn start_node_is_parsed_separately() {
    let flow = service_flow();
    let start = flow.start_node().expect("start node");
    assert_eq!(start.subtype, "start");
    assert!(flow.elements.iter().all(|e| e.subtype() != "start"));
    assert_eq!(flow.start_reference, "get_open_orders");
}

#[test]
fn legacy_start_element_reference_resolves() {
    let flow = parse_source(
        "Legacy_Start.flow-meta.xml",
        include_str!("fixtures/Legacy_Start.flow-meta.xml"),
    )
    .unwrap();
    assert!(flow.start_node().is_none());
    assert_eq!(flow.start_reference, "first_assign");
}

#[test]
fn scheduled_path_start_resolves() {
    let flow = parse_source(
        "Scheduled_Path.flow-meta.xml",
        include_str!("fixtures/Scheduled_Path.flow-meta.xml"),
    )
    .unwrap();
    assert_eq!(flow.start_reference, "notify_owner");
}

#[test]
fn trigger_order_is_numeric() {
    let flow = parse_source(
        "Missing_Fault_Path.flow-meta.xml",
        include_str!("fixtures/Missing_Fault_Path.flow-meta.xml"),
    )
    .unwrap();
    assert_eq!(flow.trigger_order, Some(10));
}

#[test]
fn decision_edges_carry_their_kinds() {
    let flow = service_flow();
    let decision = flow.nodes().find(|n| n.subtype == "decisions").unwrap();
    assert!(decision.connector(ConnectorKind::Default).is_some());
    assert!(decision.connector(ConnectorKind::Outcome).is_some());
    let lookup = flow.nodes().find(|n| n.subtype == "recordLookups").unwrap();
    assert!(lookup.connector(ConnectorKind::Fault).is_some());
}

#[test]
fn round_trip_preserves_name_subtype_pairs() {
    let flow = service_flow();
    let reparsed = Flow::parse("Service_OrderFulfillment.flow-meta.xml", flow.to_tree());

    let mut original: Vec<(String, String)> = flow
        .elements
        .iter()
        .map(|e| (e.name().to_string(), e.subtype().to_string()))
        .collect();
    let mut round_tripped: Vec<(String, String)> = reparsed
        .elements
        .iter()
        .map(|e| (e.name().to_string(), e.subtype().to_string()))
        .collect();
    original.sort();
    round_tripped.sort();
    assert_eq!(original, round_tripped);
    assert_eq!(reparsed.start_reference, flow.start_reference);
}

#[test]
fn batch_parse_isolates_bad_sources() {
    let parsed = parse_flows([
        (
            "Service_OrderFulfillment.flow-meta.xml",
            include_str!("fixtures/Service_OrderFulfillment.flow-meta.xml"),
        ),
        ("Broken.flow-meta.xml", "<Flow><label>oops</Flow>"),
    ]);
    assert_eq!(parsed.len(), 2);
    assert!(parsed[0].flow.is_some());
    assert!(parsed[1].flow.is_none());
    assert!(parsed[1].error_message.is_some());
}

#[test]
fn unrecognized_tags_are_skipped() {
    let flow = parse_source(
        "Future.flow-meta.xml",
        "<Flow><label>Future</label><quantumSteps><name>q</name></quantumSteps></Flow>",
    )
    .unwrap();
    assert!(flow.elements.iter().all(|e| e.subtype() != "quantumSteps"));
    assert_eq!(flow.elements.len(), 1);
}
