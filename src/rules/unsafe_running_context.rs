//! Flags flows configured to run in system context without sharing.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Rule, RuleInfo, flow_type};
use crate::parse::types::{Flow, FlowAttribute};
use crate::parse::xml::value_str;
use crate::result::{Severity, Violation};

pub struct UnsafeRunningContext {
    info: RuleInfo,
}

impl UnsafeRunningContext {
    pub fn new() -> Self {
        UnsafeRunningContext {
            info: RuleInfo {
                name: "UnsafeRunningContext",
                label: "Unsafe Running Context",
                description: "This flow is configured to run in system mode without sharing, \
                              granting all users the permission to view and edit all data in the \
                              org. Running in this context should be a deliberate, reviewed \
                              choice.",
                doc_refs: vec![],
                supported_types: flow_type::all(),
                default_severity: Severity::Warning,
                suppression_element: None,
            },
        }
    }
}

impl Default for UnsafeRunningContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for UnsafeRunningContext {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn check(
        &self,
        flow: &Flow,
        _options: Option<&Map<String, Value>>,
        _suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        let run_in_mode = flow.attribute("runInMode").and_then(value_str);
        if run_in_mode.as_deref() == Some("SystemModeWithoutSharing") {
            vec![Violation::from_attribute(FlowAttribute::new(
                "runInMode",
                "runInMode",
                run_in_mode,
            ))]
        } else {
            vec![]
        }
    }
}
