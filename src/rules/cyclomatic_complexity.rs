//! Flags flows whose branching complexity exceeds a threshold.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Rule, RuleInfo, flow_type};
use crate::parse::types::{Flow, FlowAttribute};
use crate::parse::xml::{iter_entries, value_str};
use crate::result::{Severity, Violation};

const DEFAULT_THRESHOLD: u64 = 25;

pub struct CyclomaticComplexity {
    info: RuleInfo,
}

impl CyclomaticComplexity {
    pub fn new() -> Self {
        CyclomaticComplexity {
            info: RuleInfo {
                name: "CyclomaticComplexity",
                label: "Cyclomatic Complexity",
                description: "The number of linearly independent paths through the flow: one, plus \
                              one per decision outcome and loop. Flows above the threshold are \
                              hard to reason about and should be split into subflows.",
                doc_refs: vec![],
                supported_types: flow_type::all(),
                default_severity: Severity::Error,
                suppression_element: None,
            },
        }
    }
}

impl Default for CyclomaticComplexity {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for CyclomaticComplexity {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn is_configurable(&self) -> bool {
        true
    }

    fn check(
        &self,
        flow: &Flow,
        options: Option<&Map<String, Value>>,
        _suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        let threshold = options
            .and_then(|o| o.get("threshold"))
            .and_then(|v| v.as_u64().or_else(|| value_str(v)?.parse().ok()))
            .unwrap_or(DEFAULT_THRESHOLD);

        let mut complexity: u64 = 1;
        for node in flow.nodes() {
            match node.subtype.as_str() {
                // one path per outcome plus the default branch
                "decisions" => {
                    complexity += iter_entries(node.element.get("rules")).count() as u64 + 1;
                }
                "loops" => complexity += 1,
                _ => {}
            }
        }

        if complexity > threshold {
            vec![Violation::from_attribute(FlowAttribute::new(
                "CyclomaticComplexity",
                "flow",
                Some(complexity.to_string()),
            ))]
        } else {
            vec![]
        }
    }
}
