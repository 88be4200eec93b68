//! Element model: typed views over one flow's decoded tree.
//!
//! A flow is a directed graph of typed automation steps plus the variables,
//! resources, and metadata they reference. Elements keep the raw decoded
//! sub-tree alongside the handful of fields the scanner reads structurally,
//! so rules can fall back to the tree for schema corners the model does not
//! lift out.

use serde::Serialize;
use serde_json::{Map, Value};

use super::xml::{iter_entries, value_str};

// =============================================================================
// TAG CLASSIFICATION
// =============================================================================

/// Top-level tags that describe the flow itself rather than a graph element.
pub const ATTRIBUTE_TAGS: &[&str] = &[
    "description",
    "apiVersion",
    "processMetadataValues",
    "processType",
    "interviewLabel",
    "label",
    "status",
    "runInMode",
    "startElementReference",
    "isTemplate",
    "fullName",
    "timeZoneSidKey",
    "isAdditionalPermissionRequiredToRun",
    "migratedFromWorkflowRuleName",
    "triggerOrder",
    "environments",
    "segment",
];

/// Top-level tags holding canvas nodes (the graph vertices).
pub const NODE_TAGS: &[&str] = &[
    "actionCalls",
    "apexPluginCalls",
    "assignments",
    "collectionProcessors",
    "decisions",
    "loops",
    "orchestratedStages",
    "recordCreates",
    "recordDeletes",
    "recordLookups",
    "recordUpdates",
    "recordRollbacks",
    "screens",
    "steps",
    "subflows",
    "waits",
    "transforms",
    "customErrors",
];

pub const RESOURCE_TAGS: &[&str] = &["textTemplates", "stages"];

pub const VARIABLE_TAGS: &[&str] = &[
    "choices",
    "constants",
    "dynamicChoiceSets",
    "formulas",
    "variables",
];

/// Default XML namespace written back on re-serialization.
pub const FLOW_XML_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";

// =============================================================================
// ELEMENT MODEL
// =============================================================================

/// Category of an element, one per model variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaType {
    Node,
    Variable,
    Resource,
    Metadata,
    Attribute,
}

/// Kind of a directed edge between two node elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorKind {
    /// Plain next-element edge.
    Regular,
    /// Decision-outcome or wait-event edge.
    Outcome,
    /// Fallback edge of a decision or wait.
    Default,
    /// Error-handling branch.
    Fault,
    /// Loop iteration edge (into the loop body).
    NextValue,
    /// Loop exit edge.
    NoMoreValues,
    /// Async scheduled-path edge on a trigger.
    ScheduledPath,
}

impl ConnectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorKind::Regular => "connector",
            ConnectorKind::Outcome => "outcomeConnector",
            ConnectorKind::Default => "defaultConnector",
            ConnectorKind::Fault => "faultConnector",
            ConnectorKind::NextValue => "nextValueConnector",
            ConnectorKind::NoMoreValues => "noMoreValuesConnector",
            ConnectorKind::ScheduledPath => "scheduledPathConnector",
        }
    }
}

/// A typed edge from one node element to another, referenced by target name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    pub kind: ConnectorKind,
    pub reference: String,
}

/// A canvas node: a step in the automation graph.
#[derive(Debug, Clone)]
pub struct FlowNode {
    pub name: String,
    pub subtype: String,
    /// Raw decoded sub-tree of this node.
    pub element: Value,
    pub connectors: Vec<Connector>,
    pub location_x: Option<String>,
    pub location_y: Option<String>,
}

impl FlowNode {
    pub fn new(name: String, subtype: &str, element: Value) -> Self {
        let connectors = collect_connectors(&element);
        let location_x = element.get("locationX").and_then(value_str);
        let location_y = element.get("locationY").and_then(value_str);
        FlowNode {
            name,
            subtype: subtype.to_string(),
            element,
            connectors,
            location_x,
            location_y,
        }
    }

    /// First connector of the given kind, if any.
    pub fn connector(&self, kind: ConnectorKind) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.kind == kind)
    }
}

/// A variable-like resource (variables, constants, formulas, choices).
#[derive(Debug, Clone)]
pub struct FlowVariable {
    pub name: String,
    pub subtype: String,
    pub data_type: String,
    pub element: Value,
}

impl FlowVariable {
    pub fn new(name: String, subtype: &str, element: Value) -> Self {
        let data_type = element
            .get("dataType")
            .and_then(value_str)
            .unwrap_or_default();
        FlowVariable {
            name,
            subtype: subtype.to_string(),
            data_type,
            element,
        }
    }
}

/// A non-graph resource (text templates, stages).
#[derive(Debug, Clone)]
pub struct FlowResource {
    pub name: String,
    pub subtype: String,
    pub element: Value,
}

/// A flow-level metadata entry.
#[derive(Debug, Clone)]
pub struct FlowMetadata {
    pub name: String,
    pub subtype: String,
    pub element: Value,
}

/// Synthetic anchor for a violation that is not about a specific graph
/// element, e.g. a missing flow-level property. Never part of `elements`.
#[derive(Debug, Clone)]
pub struct FlowAttribute {
    pub name: String,
    pub subtype: String,
    pub expression: Option<String>,
}

impl FlowAttribute {
    pub fn new(
        name: impl Into<String>,
        subtype: impl Into<String>,
        expression: Option<String>,
    ) -> Self {
        FlowAttribute {
            name: name.into(),
            subtype: subtype.into(),
            expression,
        }
    }
}

/// One constituent piece of a flow, tagged by category.
#[derive(Debug, Clone)]
pub enum Element {
    Node(FlowNode),
    Variable(FlowVariable),
    Resource(FlowResource),
    Metadata(FlowMetadata),
}

impl Element {
    pub fn name(&self) -> &str {
        match self {
            Element::Node(e) => &e.name,
            Element::Variable(e) => &e.name,
            Element::Resource(e) => &e.name,
            Element::Metadata(e) => &e.name,
        }
    }

    pub fn subtype(&self) -> &str {
        match self {
            Element::Node(e) => &e.subtype,
            Element::Variable(e) => &e.subtype,
            Element::Resource(e) => &e.subtype,
            Element::Metadata(e) => &e.subtype,
        }
    }

    pub fn meta_type(&self) -> MetaType {
        match self {
            Element::Node(_) => MetaType::Node,
            Element::Variable(_) => MetaType::Variable,
            Element::Resource(_) => MetaType::Resource,
            Element::Metadata(_) => MetaType::Metadata,
        }
    }

    pub fn data(&self) -> &Value {
        match self {
            Element::Node(e) => &e.element,
            Element::Variable(e) => &e.element,
            Element::Resource(e) => &e.element,
            Element::Metadata(e) => &e.element,
        }
    }

    pub fn as_node(&self) -> Option<&FlowNode> {
        match self {
            Element::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&FlowVariable> {
        match self {
            Element::Variable(v) => Some(v),
            _ => None,
        }
    }
}

/// Extract every typed edge from a node's raw sub-tree.
fn collect_connectors(element: &Value) -> Vec<Connector> {
    let mut out = Vec::new();
    push_connector(&mut out, element.get("connector"), ConnectorKind::Regular);
    push_connector(&mut out, element.get("faultConnector"), ConnectorKind::Fault);
    push_connector(
        &mut out,
        element.get("defaultConnector"),
        ConnectorKind::Default,
    );
    push_connector(
        &mut out,
        element.get("nextValueConnector"),
        ConnectorKind::NextValue,
    );
    push_connector(
        &mut out,
        element.get("noMoreValuesConnector"),
        ConnectorKind::NoMoreValues,
    );
    for rule in iter_entries(element.get("rules")) {
        push_connector(&mut out, rule.get("connector"), ConnectorKind::Outcome);
    }
    for event in iter_entries(element.get("waitEvents")) {
        push_connector(&mut out, event.get("connector"), ConnectorKind::Outcome);
    }
    for path in iter_entries(element.get("scheduledPaths")) {
        push_connector(&mut out, path.get("connector"), ConnectorKind::ScheduledPath);
    }
    out
}

fn push_connector(out: &mut Vec<Connector>, value: Option<&Value>, kind: ConnectorKind) {
    for entry in iter_entries(value) {
        if let Some(reference) = entry.get("targetReference").and_then(value_str) {
            if !reference.is_empty() {
                out.push(Connector { kind, reference });
            }
        }
    }
}

// =============================================================================
// FLOW
// =============================================================================

/// One parsed flow definition.
///
/// Constructed once at parse time; derived fields (`elements`,
/// `start_reference`) are computed during construction and never mutated.
#[derive(Debug, Clone)]
pub struct Flow {
    /// Derived from the file name, all extensions stripped.
    pub name: String,
    pub uri: String,
    pub label: String,
    pub process_type: String,
    pub status: String,
    pub trigger_order: Option<u32>,
    /// Explicit first-element reference, as recorded in the schema.
    pub start_element_reference: Option<String>,
    /// The special entry pseudo-element. Never placed in `elements`.
    pub start_node: Option<FlowNode>,
    /// Computed name of the first element to execute; empty when the flow has
    /// no determinable entry point.
    pub start_reference: String,
    pub elements: Vec<Element>,
    /// The raw decoded tree, kept for round-trip re-serialization.
    pub xmldata: Value,
}

impl Flow {
    /// Build a flow from an already-decoded tree. The tree may or may not
    /// carry the `Flow` document-element wrapper.
    pub fn parse(uri: &str, tree: Value) -> Self {
        let xmldata = match tree {
            Value::Object(mut doc) if doc.contains_key("Flow") => {
                doc.remove("Flow").unwrap_or(Value::Object(Map::new()))
            }
            other => other,
        };

        let empty = Map::new();
        let entries = xmldata.as_object().unwrap_or(&empty);

        let label = entries.get("label").and_then(value_str).unwrap_or_default();
        let process_type = entries
            .get("processType")
            .and_then(value_str)
            .unwrap_or_else(|| "AutoLaunchedFlow".into());
        let status = entries
            .get("status")
            .and_then(value_str)
            .unwrap_or_else(|| "Draft".into());
        let trigger_order = entries
            .get("triggerOrder")
            .and_then(value_str)
            .and_then(|s| s.parse().ok());
        let start_element_reference = entries
            .get("startElementReference")
            .and_then(value_str)
            .filter(|s| !s.is_empty());

        let mut elements = Vec::new();
        let mut start_node = None;
        for (tag, data) in entries {
            if tag.starts_with('@') {
                continue;
            }
            if tag == "start" {
                // the entry pseudo-element lives outside the element list
                let entry = match data {
                    Value::Array(items) => items.first(),
                    single => Some(single),
                };
                if let Some(entry) = entry {
                    let name = entry
                        .get("name")
                        .and_then(value_str)
                        .unwrap_or_else(|| "start".into());
                    start_node = Some(FlowNode::new(name, "start", entry.clone()));
                }
                continue;
            }

            if ATTRIBUTE_TAGS.contains(&tag.as_str()) {
                expand_tag(&mut elements, tag, data, |name, subtype, element| {
                    Element::Metadata(FlowMetadata {
                        name,
                        subtype: subtype.to_string(),
                        element,
                    })
                });
            } else if VARIABLE_TAGS.contains(&tag.as_str()) {
                expand_tag(&mut elements, tag, data, |name, subtype, element| {
                    Element::Variable(FlowVariable::new(name, subtype, element))
                });
            } else if NODE_TAGS.contains(&tag.as_str()) {
                expand_tag(&mut elements, tag, data, |name, subtype, element| {
                    Element::Node(FlowNode::new(name, subtype, element))
                });
            } else if RESOURCE_TAGS.contains(&tag.as_str()) {
                expand_tag(&mut elements, tag, data, |name, subtype, element| {
                    Element::Resource(FlowResource {
                        name,
                        subtype: subtype.to_string(),
                        element,
                    })
                });
            } else {
                tracing::debug!(tag = tag.as_str(), "skipping unrecognized flow tag");
            }
        }

        let start_reference =
            find_start(start_element_reference.as_deref(), start_node.as_ref());

        Flow {
            name: flow_name_from_uri(uri),
            uri: uri.to_string(),
            label,
            process_type,
            status,
            trigger_order,
            start_element_reference,
            start_node,
            start_reference,
            elements,
            xmldata,
        }
    }

    /// The entry pseudo-element, if the flow has one.
    pub fn start_node(&self) -> Option<&FlowNode> {
        self.start_node.as_ref()
    }

    /// Computed first-element name, or `None` for an empty reference.
    pub fn start_reference(&self) -> Option<&str> {
        if self.start_reference.is_empty() {
            None
        } else {
            Some(&self.start_reference)
        }
    }

    /// Index of the start element within an arbitrary node list.
    pub fn find_start_index(&self, nodes: &[&FlowNode]) -> Option<usize> {
        let start = self.start_reference()?;
        nodes.iter().position(|n| n.name == start)
    }

    /// Read a property off the start pseudo-element's raw data, e.g.
    /// `triggerType` or `object`.
    pub fn start_property(&self, property: &str) -> Option<&Value> {
        self.start_node.as_ref()?.element.get(property)
    }

    /// Read a top-level flow attribute from the raw tree.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.xmldata.get(key)
    }

    /// Node-type elements only.
    pub fn nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.elements.iter().filter_map(Element::as_node)
    }

    /// Variable-type elements only.
    pub fn variables(&self) -> impl Iterator<Item = &FlowVariable> {
        self.elements.iter().filter_map(Element::as_variable)
    }

    /// Re-serialize the unmodified structural data back to the schema's tree
    /// shape, namespace defaulted.
    pub fn to_tree(&self) -> Value {
        let mut inner = match &self.xmldata {
            Value::Object(entries) => entries.clone(),
            _ => Map::new(),
        };
        inner
            .entry("@xmlns")
            .or_insert_with(|| Value::String(FLOW_XML_NAMESPACE.into()));

        let mut doc = Map::new();
        doc.insert("Flow".into(), Value::Object(inner));
        Value::Object(doc)
    }
}

/// Resolve the name of the first element to execute.
///
/// Priority: explicit `startElementReference`, then the start node's regular
/// connector, then its first scheduled path. Empty when none yields a value.
fn find_start(start_element_reference: Option<&str>, start_node: Option<&FlowNode>) -> String {
    if let Some(reference) = start_element_reference {
        return reference.to_string();
    }

    if let Some(start) = start_node {
        if let Some(connector) = start.connector(ConnectorKind::Regular) {
            return connector.reference.clone();
        }
        if let Some(connector) = start.connector(ConnectorKind::ScheduledPath) {
            return connector.reference.clone();
        }
    }

    String::new()
}

fn expand_tag<F>(elements: &mut Vec<Element>, tag: &str, data: &Value, build: F)
where
    F: Fn(String, &str, Value) -> Element,
{
    for entry in iter_entries(Some(data)) {
        let name = match entry {
            Value::Object(fields) => fields
                .get("name")
                .and_then(value_str)
                .unwrap_or_else(|| tag.to_string()),
            // scalar attribute tags (label, status, apiVersion, ...) have no
            // name of their own
            _ => tag.to_string(),
        };
        elements.push(build(name, tag, entry.clone()));
    }
}

fn flow_name_from_uri(uri: &str) -> String {
    let base = uri.rsplit(['/', '\\']).next().unwrap_or(uri);
    let stem = base.split('.').next().unwrap_or(base);
    if stem.is_empty() {
        "unnamed".into()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_strips_all_extensions() {
        assert_eq!(
            flow_name_from_uri("force-app/My_Flow.flow-meta.xml"),
            "My_Flow"
        );
        assert_eq!(flow_name_from_uri("My_Flow.flow"), "My_Flow");
        assert_eq!(flow_name_from_uri(""), "unnamed");
    }

    #[test]
    fn start_reference_prefers_explicit_attribute() {
        let flow = Flow::parse(
            "a.flow-meta.xml",
            json!({"Flow": {
                "startElementReference": "first",
                "start": {"connector": {"targetReference": "other"}},
            }}),
        );
        assert_eq!(flow.start_reference, "first");
    }

    #[test]
    fn start_reference_falls_back_to_start_connector() {
        let flow = Flow::parse(
            "a.flow-meta.xml",
            json!({"Flow": {"start": {"connector": {"targetReference": "step_1"}}}}),
        );
        assert_eq!(flow.start_reference, "step_1");
    }

    #[test]
    fn start_reference_falls_back_to_scheduled_path() {
        let flow = Flow::parse(
            "a.flow-meta.xml",
            json!({"Flow": {"start": {
                "triggerType": "RecordAfterSave",
                "scheduledPaths": [{"connector": {"targetReference": "async_step"}}],
            }}}),
        );
        assert_eq!(flow.start_reference, "async_step");
    }

    #[test]
    fn start_node_is_not_an_element() {
        let flow = Flow::parse(
            "a.flow-meta.xml",
            json!({"Flow": {
                "start": {"connector": {"targetReference": "s"}},
                "assignments": {"name": "s"},
            }}),
        );
        assert!(flow.start_node().is_some());
        assert_eq!(flow.elements.len(), 1);
        assert_eq!(flow.elements[0].name(), "s");
    }

    #[test]
    fn decision_connectors_include_outcomes_and_default() {
        let node = FlowNode::new(
            "route".into(),
            "decisions",
            json!({
                "rules": [
                    {"name": "r1", "connector": {"targetReference": "a"}},
                    {"name": "r2", "connector": {"targetReference": "b"}},
                ],
                "defaultConnector": {"targetReference": "c"},
            }),
        );
        let refs: Vec<&str> = node
            .connectors
            .iter()
            .map(|c| c.reference.as_str())
            .collect();
        assert_eq!(refs, vec!["c", "a", "b"]);
        assert_eq!(
            node.connector(ConnectorKind::Default).unwrap().reference,
            "c"
        );
    }

    #[test]
    fn find_start_index_locates_the_entry_element() {
        let flow = Flow::parse(
            "a.flow-meta.xml",
            json!({"Flow": {
                "start": {"connector": {"targetReference": "second"}},
                "assignments": [{"name": "first"}, {"name": "second"}],
            }}),
        );
        let nodes: Vec<&FlowNode> = flow.nodes().collect();
        assert_eq!(flow.find_start_index(&nodes), Some(1));
    }

    #[test]
    fn malformed_list_entry_does_not_abort_the_parse() {
        let flow = Flow::parse(
            "a.flow-meta.xml",
            json!({"Flow": {
                "variables": [{"name": "ok", "dataType": "String"}, "garbage"],
            }}),
        );
        assert!(flow.elements.iter().any(|e| e.name() == "ok"));
    }
}
