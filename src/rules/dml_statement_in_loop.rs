//! Flags record mutations executed inside a loop body.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::loop_path::statements_in_loops;
use super::{Rule, RuleInfo, flow_type};
use crate::parse::types::Flow;
use crate::result::{Severity, Violation};

const DML_SUBTYPES: &[&str] = &[
    "recordCreates",
    "recordUpdates",
    "recordDeletes",
    "recordRollbacks",
];

pub struct DmlStatementInLoop {
    info: RuleInfo,
}

impl DmlStatementInLoop {
    pub fn new() -> Self {
        DmlStatementInLoop {
            info: RuleInfo {
                name: "DMLStatementInLoop",
                label: "DML Statement In A Loop",
                description: "To avoid hitting governor limits, it is recommended to consolidate \
                              all data manipulation at the end of the flow, operating on \
                              collections instead of single records per iteration.",
                doc_refs: vec![],
                supported_types: flow_type::all(),
                default_severity: Severity::Error,
                suppression_element: None,
            },
        }
    }
}

impl Default for DmlStatementInLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for DmlStatementInLoop {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn check(
        &self,
        flow: &Flow,
        _options: Option<&Map<String, Value>>,
        _suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        statements_in_loops(flow, DML_SUBTYPES)
            .into_iter()
            .map(|(node, loop_name)| {
                Violation::from_node(node)
                    .with_detail("connectsTo", Value::String(loop_name.to_string()))
            })
            .collect()
    }
}
