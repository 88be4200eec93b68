//! Flags flows without a description.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Rule, RuleInfo, flow_type};
use crate::parse::types::{Flow, FlowAttribute};
use crate::parse::xml::value_str;
use crate::result::{Severity, Violation};

pub struct FlowDescription {
    info: RuleInfo,
}

impl FlowDescription {
    pub fn new() -> Self {
        FlowDescription {
            info: RuleInfo {
                name: "FlowDescription",
                label: "Missing Flow Description",
                description: "Descriptions play a vital role in documentation. It is highly \
                              recommended to include details about where a flow is used and what \
                              it accomplishes.",
                doc_refs: vec![],
                supported_types: flow_type::all(),
                default_severity: Severity::Note,
                suppression_element: None,
            },
        }
    }
}

impl Default for FlowDescription {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for FlowDescription {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn check(
        &self,
        flow: &Flow,
        _options: Option<&Map<String, Value>>,
        _suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        let description = flow
            .attribute("description")
            .and_then(value_str)
            .filter(|d| !d.trim().is_empty());

        if description.is_none() {
            vec![Violation::from_attribute(FlowAttribute::new(
                "description",
                "description",
                None,
            ))]
        } else {
            vec![]
        }
    }
}
