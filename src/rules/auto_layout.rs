//! Flags flows still built on the free-form canvas.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Rule, RuleInfo, flow_type};
use crate::parse::types::{Flow, FlowAttribute};
use crate::parse::xml::{iter_entries, value_str};
use crate::result::{Severity, Violation};

pub struct AutoLayout {
    info: RuleInfo,
}

impl AutoLayout {
    pub fn new() -> Self {
        AutoLayout {
            info: RuleInfo {
                name: "AutoLayout",
                label: "Auto-Layout Mode",
                description: "With Canvas Mode set to Auto-Layout, elements are spaced, connected, \
                              and aligned automatically, keeping the flow easier to read and \
                              maintain.",
                doc_refs: vec![],
                supported_types: flow_type::all(),
                default_severity: Severity::Note,
                suppression_element: None,
            },
        }
    }
}

impl Default for AutoLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AutoLayout {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn check(
        &self,
        flow: &Flow,
        _options: Option<&Map<String, Value>>,
        _suppressions: &HashSet<String>,
    ) -> Vec<Violation> {
        for entry in iter_entries(flow.attribute("processMetadataValues")) {
            let is_canvas_mode = entry
                .get("name")
                .and_then(value_str)
                .is_some_and(|n| n == "CanvasMode");
            if !is_canvas_mode {
                continue;
            }
            let mode = entry
                .get("value")
                .and_then(|v| v.get("stringValue"))
                .and_then(value_str);
            if mode.as_deref() != Some("AUTO_LAYOUT_CANVAS") {
                return vec![Violation::from_attribute(FlowAttribute::new(
                    "CanvasMode",
                    "processMetadataValues",
                    mode,
                ))];
            }
        }
        vec![]
    }
}
