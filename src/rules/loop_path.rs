//! Shared iteration-path walk for in-loop statement rules.

use std::collections::{HashMap, HashSet};

use crate::parse::types::{ConnectorKind, Flow, FlowNode};

/// Find node elements of the given subtypes that sit on a loop's iteration
/// path.
///
/// The walk starts at each loop's next-value target and follows every
/// connector kind, treating the loop element itself as the boundary, so the
/// body of a cyclic loop is covered exactly once and elements past the loop
/// exit are not.
pub(crate) fn statements_in_loops<'a>(
    flow: &'a Flow,
    statement_subtypes: &[&str],
) -> Vec<(&'a FlowNode, &'a str)> {
    let by_name: HashMap<&str, &FlowNode> =
        flow.nodes().map(|n| (n.name.as_str(), n)).collect();

    let mut found = Vec::new();
    for loop_node in flow.nodes().filter(|n| n.subtype == "loops") {
        let Some(entry) = loop_node.connector(ConnectorKind::NextValue) else {
            continue;
        };

        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(loop_node.name.as_str());
        let mut pending = vec![entry.reference.as_str()];

        while let Some(name) = pending.pop() {
            if !seen.insert(name) {
                continue;
            }
            let Some(node) = by_name.get(name) else {
                continue;
            };
            if statement_subtypes.contains(&node.subtype.as_str()) {
                found.push((*node, loop_node.name.as_str()));
            }
            for connector in &node.connectors {
                pending.push(connector.reference.as_str());
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::Flow;
    use serde_json::json;

    #[test]
    fn finds_statements_inside_the_body_only() {
        let flow = Flow::parse(
            "l.flow-meta.xml",
            json!({"Flow": {
                "loops": {
                    "name": "each_record",
                    "nextValueConnector": {"targetReference": "get_inside"},
                    "noMoreValuesConnector": {"targetReference": "get_after"},
                },
                "recordLookups": [
                    {"name": "get_inside", "connector": {"targetReference": "each_record"}},
                    {"name": "get_after"},
                ],
            }}),
        );
        let found = statements_in_loops(&flow, &["recordLookups"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0.name, "get_inside");
        assert_eq!(found[0].1, "each_record");
    }
}
