//! Flags flows that are not activated.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Rule, RuleInfo, flow_type};
use crate::parse::types::{Flow, FlowAttribute};
use crate::result::{Severity, Violation};

pub struct InactiveFlow {
    info: RuleInfo,
}

impl InactiveFlow {
    pub fn new() -> Self {
        InactiveFlow {
            info: RuleInfo {
                name: "InactiveFlow",
                label: "Inactive Flow",
                description: "Like unused variables, inactive flows degrade maintainability. \
                              Flows that are obsolete should be removed; flows kept in draft or \
                              deactivated state deserve a second look.",
                doc_refs: vec![],
                supported_types: flow_type::all(),
                default_severity: Severity::Note,
                suppression_element: None,
            },
        }
    }
}

impl Default for InactiveFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for InactiveFlow {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn check(
        &self,
        flow: &Flow,
        _options: Option<&Map<String, Value>>,
        _suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        if flow.status != "Active" {
            vec![Violation::from_attribute(FlowAttribute::new(
                "status",
                "status",
                Some(flow.status.clone()),
            ))]
        } else {
            vec![]
        }
    }
}
