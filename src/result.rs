//! Result data model: violations, per-rule results, per-flow results, and
//! the flattened projection downstream formatters consume.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::parse::types::{Element, Flow, FlowAttribute, FlowNode, FlowVariable, MetaType};

// =============================================================================
// SEVERITY
// =============================================================================

/// Ranked severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "note" => Ok(Severity::Note),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

// =============================================================================
// VIOLATION
// =============================================================================

/// One finding, anchored to the offending element (or to a synthetic
/// attribute for flow-level findings).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub name: String,
    #[serde(rename = "type")]
    pub subtype: String,
    pub meta_type: MetaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_y: Option<String>,
    /// Rule-specific bag, commonly `dataType`, `connectsTo`, `expression`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl Violation {
    pub fn from_node(node: &FlowNode) -> Self {
        Violation {
            name: node.name.clone(),
            subtype: node.subtype.clone(),
            meta_type: MetaType::Node,
            location_x: node.location_x.clone(),
            location_y: node.location_y.clone(),
            details: None,
        }
    }

    pub fn from_variable(variable: &FlowVariable) -> Self {
        let mut details = Map::new();
        if !variable.data_type.is_empty() {
            details.insert(
                "dataType".into(),
                Value::String(variable.data_type.clone()),
            );
        }
        Violation {
            name: variable.name.clone(),
            subtype: variable.subtype.clone(),
            meta_type: MetaType::Variable,
            location_x: None,
            location_y: None,
            details: (!details.is_empty()).then_some(details),
        }
    }

    pub fn from_element(element: &Element) -> Self {
        match element {
            Element::Node(n) => Violation::from_node(n),
            Element::Variable(v) => Violation::from_variable(v),
            _ => Violation {
                name: element.name().to_string(),
                subtype: element.subtype().to_string(),
                meta_type: element.meta_type(),
                location_x: None,
                location_y: None,
                details: None,
            },
        }
    }

    pub fn from_attribute(attribute: FlowAttribute) -> Self {
        let mut details = Map::new();
        if let Some(expression) = attribute.expression {
            details.insert("expression".into(), Value::String(expression));
        }
        Violation {
            name: attribute.name,
            subtype: attribute.subtype,
            meta_type: MetaType::Attribute,
            location_x: None,
            location_y: None,
            details: (!details.is_empty()).then_some(details),
        }
    }

    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
        self
    }
}

// =============================================================================
// RULE / SCAN RESULTS
// =============================================================================

/// Output of one rule against one flow.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub rule_name: String,
    pub severity: Severity,
    /// True iff `details` is non-empty after suppression filtering.
    pub occurs: bool,
    pub details: Vec<Violation>,
    /// Set when the rule's execution faulted and was isolated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl RuleResult {
    pub fn new(rule_name: impl Into<String>, severity: Severity, details: Vec<Violation>) -> Self {
        RuleResult {
            rule_name: rule_name.into(),
            severity,
            occurs: !details.is_empty(),
            details,
            error_message: None,
        }
    }

    /// Empty, non-occurring result (whole-rule suppression).
    pub fn suppressed(rule_name: impl Into<String>, severity: Severity) -> Self {
        RuleResult::new(rule_name, severity, Vec::new())
    }

    /// Result recording an isolated execution fault.
    pub fn failed(
        rule_name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        RuleResult {
            rule_name: rule_name.into(),
            severity,
            occurs: false,
            details: Vec::new(),
            error_message: Some(message.into()),
        }
    }
}

/// One flow's full result set: one entry per rule that was selected and
/// applicable to the flow's type.
#[derive(Debug)]
pub struct ScanResult {
    pub flow: Flow,
    pub rule_results: Vec<RuleResult>,
}

// =============================================================================
// FLATTENED PROJECTION
// =============================================================================

/// One row per `(flow, rule, violation)` triple, ready for tables, CSV, or
/// SARIF serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatViolation {
    pub flow_file: String,
    pub flow_name: String,
    pub rule_name: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub subtype: String,
    pub name: String,
    pub meta_type: MetaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connects_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

/// Flatten scan results into one row per violation, preserving the order of
/// flows and, within a flow, the order rules were executed.
pub fn export_details(results: &[ScanResult], include_details: bool) -> Vec<FlatViolation> {
    let mut rows = Vec::new();
    for result in results {
        let flow = &result.flow;
        let flow_name = if flow.name.is_empty() {
            flow.label.clone()
        } else {
            flow.name.clone()
        };
        let flow_file = if flow.uri.is_empty() {
            format!("{}.flow-meta.xml", flow.name)
        } else {
            flow.uri.replace('\\', "/")
        };

        for rule_result in &result.rule_results {
            if !rule_result.occurs {
                continue;
            }
            for violation in &rule_result.details {
                let mut row = FlatViolation {
                    flow_file: flow_file.clone(),
                    flow_name: flow_name.clone(),
                    rule_name: rule_result.rule_name.clone(),
                    severity: rule_result.severity,
                    subtype: violation.subtype.clone(),
                    name: violation.name.clone(),
                    meta_type: violation.meta_type,
                    location_x: None,
                    location_y: None,
                    data_type: None,
                    connects_to: None,
                    expression: None,
                };
                if include_details {
                    row.location_x = violation.location_x.clone();
                    row.location_y = violation.location_y.clone();
                    if let Some(details) = &violation.details {
                        row.data_type = details.get("dataType").and_then(detail_str);
                        row.connects_to = details.get("connectsTo").and_then(detail_str);
                        row.expression = details.get("expression").and_then(detail_str);
                    }
                }
                rows.push(row);
            }
        }
    }
    rows
}

fn detail_str(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(detail_str)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    }
}

// =============================================================================
// THRESHOLD POLICY
// =============================================================================

/// Aggregate violation counts by severity across a whole scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub notes: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.notes
    }
}

pub fn severity_counts(results: &[ScanResult]) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for result in results {
        for rule_result in &result.rule_results {
            if !rule_result.occurs {
                continue;
            }
            match rule_result.severity {
                Severity::Error => counts.errors += rule_result.details.len(),
                Severity::Warning => counts.warnings += rule_result.details.len(),
                Severity::Note => counts.notes += rule_result.details.len(),
            }
        }
    }
    counts
}

/// Pass/fail policy computable from severity counts alone. The host maps
/// `failed` onto its exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Threshold {
    Never,
    Error,
    Warning,
    Note,
}

impl Threshold {
    pub fn failed(&self, counts: &SeverityCounts) -> bool {
        match self {
            Threshold::Never => false,
            Threshold::Error => counts.errors > 0,
            Threshold::Warning => counts.errors > 0 || counts.warnings > 0,
            Threshold::Note => counts.total() > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_policy_over_counts() {
        let counts = SeverityCounts {
            errors: 0,
            warnings: 2,
            notes: 1,
        };
        assert!(!Threshold::Never.failed(&counts));
        assert!(!Threshold::Error.failed(&counts));
        assert!(Threshold::Warning.failed(&counts));
        assert!(Threshold::Note.failed(&counts));
    }

    #[test]
    fn severity_parses_only_valid_levels() {
        assert_eq!("warning".parse(), Ok(Severity::Warning));
        assert!("critical".parse::<Severity>().is_err());
    }
}
