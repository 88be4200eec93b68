//! Flags record-triggered flows without an explicit trigger-order value.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{DocRef, Rule, RuleInfo, flow_type};
use crate::parse::types::{Flow, FlowAttribute};
use crate::parse::xml::value_str;
use crate::result::{Severity, Violation};

pub struct TriggerOrder {
    info: RuleInfo,
}

impl TriggerOrder {
    pub fn new() -> Self {
        TriggerOrder {
            info: RuleInfo {
                name: "TriggerOrder",
                label: "Trigger Order",
                description: "With flow trigger ordering, admins can assign a priority value to \
                              their flows and guarantee their execution order. The priority value \
                              is not absolute, so values need not be sequentially numbered.",
                doc_refs: vec![DocRef {
                    label: "Learn more about flow ordering orchestration",
                    path: "https://architect.salesforce.com/decision-guides/trigger-automation",
                }],
                supported_types: vec![flow_type::AUTOLAUNCHED],
                default_severity: Severity::Note,
                suppression_element: None,
            },
        }
    }
}

impl Default for TriggerOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for TriggerOrder {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn check(
        &self,
        flow: &Flow,
        _options: Option<&Map<String, Value>>,
        _suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        // no `object` on the start node means this is not record-triggered
        let triggers_on_object = flow
            .start_property("object")
            .and_then(value_str)
            .is_some_and(|o| !o.is_empty());
        if !triggers_on_object {
            return vec![];
        }

        if flow.trigger_order.is_none() {
            vec![Violation::from_attribute(FlowAttribute::new(
                "TriggerOrder",
                "TriggerOrder",
                Some("10, 20, 30 ...".into()),
            ))]
        } else {
            vec![]
        }
    }
}
