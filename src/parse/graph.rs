//! petgraph-based reachability traversal over a flow's node elements.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;

use super::types::{ConnectorKind, Flow, FlowNode};

/// Name-indexed adjacency over a flow's node elements.
///
/// Every connector kind contributes an edge: fault and scheduled-path edges
/// count toward reachability exactly like regular ones. Connector references
/// that do not resolve to an element are skipped, never an error.
pub struct FlowGraph {
    pub graph: DiGraph<String, ConnectorKind>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl FlowGraph {
    pub fn build(flow: &Flow) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for node in flow.nodes() {
            let idx = graph.add_node(node.name.clone());
            node_indices.insert(node.name.clone(), idx);
        }

        for node in flow.nodes() {
            let source = node_indices[&node.name];
            for connector in &node.connectors {
                // dangling references are unreachable targets, not failures
                if let Some(&target) = node_indices.get(&connector.reference) {
                    graph.add_edge(source, target, connector.kind);
                }
            }
        }

        FlowGraph {
            graph,
            node_indices,
        }
    }
}

/// Visit every node element reachable from `start_name`, once each.
///
/// Cycles are legal in this schema (loops reference earlier elements); the
/// BFS visited-set guarantees termination. An unresolvable `start_name`
/// visits nothing and raises no error.
pub fn traverse<'a, F>(flow: &'a Flow, start_name: &str, mut visit: F)
where
    F: FnMut(&'a FlowNode),
{
    let graph = FlowGraph::build(flow);
    let Some(&start_idx) = graph.node_indices.get(start_name) else {
        return;
    };

    let by_name: HashMap<&str, &FlowNode> =
        flow.nodes().map(|n| (n.name.as_str(), n)).collect();

    let mut bfs = Bfs::new(&graph.graph, start_idx);
    while let Some(idx) = bfs.next(&graph.graph) {
        if let Some(node) = by_name.get(graph.graph[idx].as_str()) {
            visit(node);
        }
    }
}

/// Names of all node elements reachable from `start_name`.
pub fn reachable(flow: &Flow, start_name: &str) -> HashSet<String> {
    let mut seen = HashSet::new();
    traverse(flow, start_name, |node| {
        seen.insert(node.name.clone());
    });
    seen
}
