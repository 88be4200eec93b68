//! Flags flow names that break the configured naming convention.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::{Rule, RuleInfo, flow_type};
use crate::parse::types::{Flow, FlowAttribute};
use crate::result::{Severity, Violation};

const DEFAULT_PATTERN: &str = "[A-Za-z0-9]+_[A-Za-z0-9]+";

static DEFAULT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_PATTERN).expect("default pattern compiles"));

pub struct FlowName {
    info: RuleInfo,
}

impl FlowName {
    pub fn new() -> Self {
        FlowName {
            info: RuleInfo {
                name: "FlowName",
                label: "Flow Naming Convention",
                description: "The readability of a flow is of utmost importance. Establishing a \
                              naming convention significantly enhances findability, searchability, \
                              and maintains overall consistency. A naming convention should at \
                              least include a domain and a short description of the action taking \
                              place, e.g. 'Service_OrderFulfillment'.",
                doc_refs: vec![],
                supported_types: flow_type::all(),
                default_severity: Severity::Error,
                suppression_element: None,
            },
        }
    }
}

impl Default for FlowName {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for FlowName {
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
        let configured = options
            .and_then(|o| o.get("expression"))
            .and_then(Value::as_str);

        let (pattern, matched) = match configured {
            Some(expression) => match Regex::new(expression) {
                Ok(regex) => (expression.to_string(), regex.is_match(&flow.name)),
                Err(e) => {
                    tracing::warn!(expression, error = %e, "invalid naming expression, using default");
                    (DEFAULT_PATTERN.to_string(), DEFAULT_REGEX.is_match(&flow.name))
                }
            },
            None => (DEFAULT_PATTERN.to_string(), DEFAULT_REGEX.is_match(&flow.name)),
        };

        if matched {
            vec![]
        } else {
            vec![Violation::from_attribute(FlowAttribute::new(
                flow.name.clone(),
                "name",
                Some(pattern),
            ))]
        }
    }
}
