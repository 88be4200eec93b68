//! Flags elements not reachable from the flow's entry point.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Rule, RuleInfo, flow_type};
use crate::parse::graph::reachable;
use crate::parse::types::Flow;
use crate::result::{Severity, Violation};

pub struct UnconnectedElement {
    info: RuleInfo,
}

impl UnconnectedElement {
    pub fn new() -> Self {
        UnconnectedElement {
            info: RuleInfo {
                name: "UnconnectedElement",
                label: "Unconnected Element",
                description: "To maintain the efficiency and manageability of your flow, it's best \
                              to avoid including unconnected elements that are not in use.",
                doc_refs: vec![],
                supported_types: flow_type::all(),
                default_severity: Severity::Error,
                suppression_element: None,
            },
        }
    }
}

impl Default for UnconnectedElement {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for UnconnectedElement {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn check(
        &self,
        flow: &Flow,
        _options: Option<&Map<String, Value>>,
        suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        let connected = match flow.start_reference() {
            Some(start) => reachable(flow, start),
            // no determinable entry point: every node element is unconnected
            None => HashSet::new(),
        };

        flow.nodes()
            .filter(|n| !connected.contains(&n.name) && !suppressions.contains(&n.name))
            .map(Violation::from_node)
            .collect()
    }
}
