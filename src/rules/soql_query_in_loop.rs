//! Flags record lookups executed inside a loop body.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::loop_path::statements_in_loops;
use super::{DocRef, Rule, RuleInfo, flow_type};
use crate::parse::types::Flow;
use crate::result::{Severity, Violation};

pub struct SoqlQueryInLoop {
    info: RuleInfo,
}

impl SoqlQueryInLoop {
    pub fn new() -> Self {
        SoqlQueryInLoop {
            info: RuleInfo {
                name: "SOQLQueryInLoop",
                label: "SOQL Query In A Loop",
                description: "To prevent exceeding governor limits, it is advisable to consolidate \
                              all your queries at the conclusion of the flow.",
                doc_refs: vec![DocRef {
                    label: "Flow Best Practices",
                    path: "https://help.salesforce.com/s/articleView?id=sf.flow_prep_bestpractices.htm&type=5",
                }],
                supported_types: flow_type::BACK_END.to_vec(),
                default_severity: Severity::Error,
                suppression_element: None,
            },
        }
    }
}

impl Default for SoqlQueryInLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for SoqlQueryInLoop {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn check(
        &self,
        flow: &Flow,
        _options: Option<&Map<String, Value>>,
        _suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        statements_in_loops(flow, &["recordLookups"])
            .into_iter()
            .map(|(node, loop_name)| {
                Violation::from_node(node)
                    .with_detail("connectsTo", Value::String(loop_name.to_string()))
            })
            .collect()
    }
}
