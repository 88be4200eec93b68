//! Flags loops whose iteration path is a bare assignment, a pattern the
//! transform element replaces at a fraction of the cost.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{DocRef, Rule, RuleInfo, flow_type};
use crate::parse::types::{ConnectorKind, Flow};
use crate::result::{Severity, Violation};

pub struct TransformInsteadOfLoop {
    info: RuleInfo,
}

impl TransformInsteadOfLoop {
    pub fn new() -> Self {
        TransformInsteadOfLoop {
            info: RuleInfo {
                name: "TransformInsteadOfLoop",
                label: "Transform Instead of Loop",
                description: "Detects loop elements that directly connect to assignment elements. \
                              This pattern can often be replaced with the transform element, which \
                              is substantially more performant.",
                doc_refs: vec![DocRef {
                    label: "Transform Multiple Records - Trailhead",
                    path: "https://trailhead.salesforce.com/content/learn/modules/multirecord-elements-and-transforms-in-flows/transform-multiple-records",
                }],
                supported_types: flow_type::all(),
                default_severity: Severity::Error,
                suppression_element: None,
            },
        }
    }
}

impl Default for TransformInsteadOfLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for TransformInsteadOfLoop {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn check(
        &self,
        flow: &Flow,
        _options: Option<&Map<String, Value>>,
        _suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        for loop_node in flow.nodes().filter(|n| n.subtype == "loops") {
            let Some(next) = loop_node.connector(ConnectorKind::NextValue) else {
                continue;
            };
            let target = flow
                .elements
                .iter()
                .find(|e| e.name() == next.reference);
            if target.is_some_and(|t| t.subtype() == "assignments") {
                violations.push(
                    Violation::from_node(loop_node)
                        .with_detail("connectsTo", Value::String(next.reference.clone())),
                );
            }
        }

        violations
    }
}
