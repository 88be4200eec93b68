//! Flags data operations reached by the flow that have no error-handling
//! branch.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{DocRef, Rule, RuleInfo, flow_type};
use crate::parse::graph::traverse;
use crate::parse::types::{ConnectorKind, Flow, FlowNode};
use crate::parse::xml::value_str;
use crate::result::{Severity, Violation};

/// Subtypes where a fault path is expected.
const APPLICABLE_SUBTYPES: &[&str] = &[
    "recordLookups",
    "recordDeletes",
    "recordUpdates",
    "recordCreates",
    "waits",
    "actionCalls",
    "apexPluginCalls",
];

/// Wait variants that are pure time delays and cannot fault.
const EXEMPT_WAIT_SUBTYPES: &[&str] = &["WaitDuration", "WaitDate"];

pub struct MissingFaultPath {
    info: RuleInfo,
}

impl MissingFaultPath {
    pub fn new() -> Self {
        MissingFaultPath {
            info: RuleInfo {
                name: "MissingFaultPath",
                label: "Missing Fault Path",
                description: "At times, a flow may fail to execute a configured operation as \
                              intended. By default, the flow displays an error message to the user \
                              and notifies the admin who created the flow via email. However, you \
                              can customize this behavior by incorporating a fault path. This rule \
                              checks DML operations, actions, and invocable calls for proper error \
                              handling.",
                doc_refs: vec![DocRef {
                    label: "Flow Best Practices",
                    path: "https://help.salesforce.com/s/articleView?id=sf.flow_prep_bestpractices.htm&type=5",
                }],
                supported_types: flow_type::all(),
                default_severity: Severity::Error,
                suppression_element: None,
            },
        }
    }

    fn fault_path_applies(node: &FlowNode) -> bool {
        if !APPLICABLE_SUBTYPES.contains(&node.subtype.as_str()) {
            return false;
        }
        if node.subtype == "waits" {
            let wait_subtype = node
                .element
                .get("elementSubtype")
                .and_then(value_str)
                .unwrap_or_default();
            return !EXEMPT_WAIT_SUBTYPES.contains(&wait_subtype.as_str());
        }
        true
    }
}

impl Default for MissingFaultPath {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MissingFaultPath {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn check(
        &self,
        flow: &Flow,
        _options: Option<&Map<String, Value>>,
        suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        let applicable: HashSet<&str> = flow
            .nodes()
            .filter(|n| Self::fault_path_applies(n))
            .map(|n| n.name.as_str())
            .collect();

        // before-save record updates fault through the trigger itself
        let is_before_save = flow
            .start_property("triggerType")
            .and_then(value_str)
            .is_some_and(|t| t == "RecordBeforeSave");

        // an element targeted by some other element's fault connector is a
        // fault handler, exempt even without its own fault edge
        let fault_targets: HashSet<&str> = flow
            .nodes()
            .flat_map(|n| n.connectors.iter())
            .filter(|c| c.kind == ConnectorKind::Fault)
            .map(|c| c.reference.as_str())
            .collect();

        let mut violations = Vec::new();
        let Some(start) = flow.start_reference() else {
            return violations;
        };

        traverse(flow, start, |node| {
            if node.connector(ConnectorKind::Fault).is_some()
                || !applicable.contains(node.name.as_str())
            {
                return;
            }
            if is_before_save && node.subtype == "recordUpdates" {
                return;
            }
            if fault_targets.contains(node.name.as_str()) {
                return;
            }
            if !suppressions.contains(&node.name) {
                violations.push(Violation::from_node(node));
            }
        });

        violations
    }
}
