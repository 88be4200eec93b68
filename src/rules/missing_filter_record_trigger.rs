//! Flags record-triggered flows that run on every record change.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Rule, RuleInfo, flow_type};
use crate::parse::types::{Flow, FlowAttribute};
use crate::parse::xml::value_str;
use crate::result::{Severity, Violation};

pub struct MissingFilterRecordTrigger {
    info: RuleInfo,
}

impl MissingFilterRecordTrigger {
    pub fn new() -> Self {
        MissingFilterRecordTrigger {
            info: RuleInfo {
                name: "MissingFilterRecordTrigger",
                label: "Missing Record Trigger Filter",
                description: "Detects record-triggered flows that lack filters on changed fields \
                              or entry conditions, leading to unnecessary executions on every \
                              record change. This can degrade performance and hit governor limits \
                              faster in high-volume environments.",
                doc_refs: vec![],
                supported_types: vec![flow_type::AUTOLAUNCHED],
                default_severity: Severity::Error,
                suppression_element: None,
            },
        }
    }
}

impl Default for MissingFilterRecordTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MissingFilterRecordTrigger {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn check(
        &self,
        flow: &Flow,
        _options: Option<&Map<String, Value>>,
        _suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        let trigger_type = flow.start_property("triggerType").and_then(value_str);
        let Some(trigger_type) = trigger_type else {
            return vec![];
        };
        if trigger_type != "RecordAfterSave" && trigger_type != "RecordBeforeSave" {
            return vec![];
        }

        let has_filters = flow.start_property("filters").is_some();
        // scheduled paths carry their own entry conditions
        let has_scheduled_paths = flow.start_property("scheduledPaths").is_some();

        if !has_filters && !has_scheduled_paths {
            vec![Violation::from_attribute(FlowAttribute::new(
                trigger_type,
                "triggerType",
                Some("autolaunched && triggerType".into()),
            ))]
        } else {
            vec![]
        }
    }
}
