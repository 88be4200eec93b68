//! Rule framework: the execution contract all checks implement.

pub mod store;

mod api_version;
mod auto_layout;
mod cyclomatic_complexity;
mod dml_statement_in_loop;
mod flow_description;
mod flow_name;
mod inactive_flow;
mod loop_path;
mod missing_fault_path;
mod missing_filter_record_trigger;
mod record_id_as_string;
mod soql_query_in_loop;
mod transform_instead_of_loop;
mod trigger_order;
mod unconnected_element;
mod unsafe_running_context;

pub use api_version::ApiVersion;
pub use auto_layout::AutoLayout;
pub use cyclomatic_complexity::CyclomaticComplexity;
pub use dml_statement_in_loop::DmlStatementInLoop;
pub use flow_description::FlowDescription;
pub use flow_name::FlowName;
pub use inactive_flow::InactiveFlow;
pub use missing_fault_path::MissingFaultPath;
pub use missing_filter_record_trigger::MissingFilterRecordTrigger;
pub use record_id_as_string::RecordIdAsString;
pub use soql_query_in_loop::SoqlQueryInLoop;
pub use transform_instead_of_loop::TransformInsteadOfLoop;
pub use trigger_order::TriggerOrder;
pub use unconnected_element::UnconnectedElement;
pub use unsafe_running_context::UnsafeRunningContext;

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::parse::types::Flow;
use crate::result::{RuleResult, Severity, Violation};

/// Process-type vocabulary rules declare support against.
pub mod flow_type {
    pub const AUTOLAUNCHED: &str = "AutoLaunchedFlow";

    /// Flows that run without a user-facing screen.
    pub const BACK_END: &[&str] = &[
        "AutoLaunchedFlow",
        "Workflow",
        "CustomEvent",
        "InvocableProcess",
    ];

    /// Flows with a visual canvas surface.
    pub const VISUAL: &[&str] = &["Flow", "Orchestrator"];

    pub fn all() -> Vec<&'static str> {
        [BACK_END, VISUAL].concat()
    }
}

/// Documentation reference attached to a rule.
#[derive(Debug, Clone)]
pub struct DocRef {
    pub label: &'static str,
    pub path: &'static str,
}

/// Descriptive metadata of one rule, immutable after construction.
#[derive(Debug, Clone)]
pub struct RuleInfo {
    /// Unique id, also the configuration key.
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub doc_refs: Vec<DocRef>,
    /// Process types the rule applies to.
    pub supported_types: Vec<&'static str>,
    pub default_severity: Severity,
    /// Schema element that can carry an in-flow suppression for this rule.
    pub suppression_element: Option<&'static str>,
}

/// A pluggable check over one flow.
///
/// Implementations are stateless: `check` reads the flow and its options and
/// returns candidate violations; it never mutates shared state, which is what
/// makes per-(flow, rule) parallel execution safe.
pub trait Rule: Send + Sync {
    fn info(&self) -> &RuleInfo;

    /// Whether `check` reads its options input. Declared explicitly per rule;
    /// the test suite asserts the flag matches actual options sensitivity so
    /// it cannot drift from the implementation.
    fn is_configurable(&self) -> bool {
        false
    }

    fn check(
        &self,
        flow: &Flow,
        options: Option<&Map<String, Value>>,
        suppressions: &HashSet<String>,
    ) -> Vec<Violation>;
}

/// A selected rule bound to its resolved severity and configured options.
pub struct RuleDefinition {
    rule: Box<dyn Rule>,
    pub severity: Severity,
    pub options: Option<Map<String, Value>>,
}

impl RuleDefinition {
    pub fn new(rule: Box<dyn Rule>) -> Self {
        let severity = rule.info().default_severity;
        RuleDefinition {
            rule,
            severity,
            options: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.rule.info().name
    }

    pub fn label(&self) -> &'static str {
        self.rule.info().label
    }

    pub fn description(&self) -> &'static str {
        self.rule.info().description
    }

    pub fn doc_refs(&self) -> &[DocRef] {
        &self.rule.info().doc_refs
    }

    pub fn is_configurable(&self) -> bool {
        self.rule.is_configurable()
    }

    pub fn supports(&self, process_type: &str) -> bool {
        self.rule
            .info()
            .supported_types
            .iter()
            .any(|t| *t == process_type)
    }

    /// Run the rule with suppression handling.
    ///
    /// A wildcard `"*"` suppression disables the whole rule without invoking
    /// its check; otherwise violations anchored to suppressed element names
    /// are filtered out of the result.
    pub fn execute(&self, flow: &Flow, suppressions: &[String]) -> RuleResult {
        if suppressions.iter().any(|s| s == "*") {
            return RuleResult::suppressed(self.name(), self.severity);
        }

        let suppression_set: HashSet<String> = suppressions.iter().cloned().collect();
        let mut violations = self
            .rule
            .check(flow, self.options.as_ref(), &suppression_set);
        violations.retain(|v| !suppression_set.contains(&v.name));
        RuleResult::new(self.name(), self.severity, violations)
    }
}
