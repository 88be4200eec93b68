//! Flags flows with a missing or outdated API version.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Rule, RuleInfo, flow_type};
use crate::parse::types::{Flow, FlowAttribute};
use crate::parse::xml::value_str;
use crate::result::{Severity, Violation};

pub struct ApiVersion {
    info: RuleInfo,
}

impl ApiVersion {
    pub fn new() -> Self {
        ApiVersion {
            info: RuleInfo {
                name: "APIVersion",
                label: "Outdated API Version",
                description: "Introducing newer API components may lead to unexpected issues with \
                              older API versions of flows, as they might not align with the \
                              underlying mechanics. Starting from API version 50.0, the 'Api \
                              Version' setting became available, enabling you to link your flow to \
                              a specific API version.",
                doc_refs: vec![],
                supported_types: flow_type::all(),
                default_severity: Severity::Error,
                suppression_element: None,
            },
        }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ApiVersion {
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
        let version = flow
            .attribute("apiVersion")
            .and_then(value_str)
            .filter(|v| !v.is_empty());

        let Some(version) = version else {
            return vec![Violation::from_attribute(FlowAttribute::new(
                "apiVersion",
                "apiVersion",
                None,
            ))];
        };

        let Some(expression) = options
            .and_then(|o| o.get("expression"))
            .and_then(Value::as_str)
        else {
            return vec![];
        };

        match version_matches(&version, expression) {
            Some(true) | None => vec![],
            Some(false) => vec![Violation::from_attribute(FlowAttribute::new(
                "apiVersion",
                "apiVersion",
                Some(version),
            ))],
        }
    }
}

/// Evaluate expressions like `">=58"`, `"<60"`, `"==59"`. `None` when either
/// side fails to parse (the rule then stays quiet rather than guessing).
fn version_matches(version: &str, expression: &str) -> Option<bool> {
    let version: f64 = version.parse().ok()?;
    for op in ["<=", ">=", "===", "==", "=", "<", ">"] {
        if let Some(rest) = expression.strip_prefix(op) {
            let expected: f64 = rest.trim().parse().ok()?;
            return Some(match op {
                "<=" => version <= expected,
                ">=" => version >= expected,
                "<" => version < expected,
                ">" => version > expected,
                _ => version == expected,
            });
        }
    }
    tracing::warn!(expression, "unrecognized apiVersion expression");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_comparisons() {
        assert_eq!(version_matches("59.0", ">=58"), Some(true));
        assert_eq!(version_matches("57.0", ">=58"), Some(false));
        assert_eq!(version_matches("58.0", "==58"), Some(true));
        assert_eq!(version_matches("58.0", "latest"), None);
    }
}
