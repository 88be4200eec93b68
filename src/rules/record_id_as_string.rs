//! Flags text input variables named for a record identifier where the whole
//! record could be passed instead.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Rule, RuleInfo, flow_type};
use crate::parse::types::Flow;
use crate::parse::xml::value_str;
use crate::result::{Severity, Violation};

pub struct RecordIdAsString {
    info: RuleInfo,
}

impl RecordIdAsString {
    pub fn new() -> Self {
        let mut supported_types = flow_type::VISUAL.to_vec();
        supported_types.push(flow_type::AUTOLAUNCHED);
        RecordIdAsString {
            info: RuleInfo {
                name: "RecordIdAsString",
                label: "Record ID as String Instead of Record",
                description: "Detects flows using a String variable named 'recordId' as input when \
                              they could receive the entire record object instead, eliminating \
                              the need for an additional lookup and improving performance.",
                doc_refs: vec![],
                supported_types,
                default_severity: Severity::Error,
                suppression_element: None,
            },
        }
    }
}

impl Default for RecordIdAsString {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for RecordIdAsString {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn check(
        &self,
        flow: &Flow,
        _options: Option<&Map<String, Value>>,
        _suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        // record-triggered flows receive the record implicitly
        let is_record_triggered = flow
            .start_property("triggerType")
            .and_then(value_str)
            .is_some_and(|t| t == "RecordAfterSave" || t == "RecordBeforeSave");
        if is_record_triggered {
            return vec![];
        }

        flow.variables()
            .filter(|variable| {
                let is_input = match variable.element.get("isInput") {
                    Some(Value::Bool(b)) => *b,
                    Some(Value::String(s)) => s == "true",
                    _ => false,
                };
                is_input
                    && variable.name.eq_ignore_ascii_case("recordid")
                    && variable.data_type == "String"
            })
            .map(Violation::from_variable)
            .collect()
    }
}
