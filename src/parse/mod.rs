//! Parse phase: raw flow XML → decoded tree → typed `Flow`.

pub mod graph;
pub mod types;
pub mod xml;

pub use graph::{FlowGraph, reachable, traverse};
pub use types::*;

use crate::error::ScanError;

/// Outcome of parsing one source: either a flow, or the decode error that
/// kept it out of the scan.
#[derive(Debug)]
pub struct ParsedFlow {
    pub uri: String,
    pub flow: Option<Flow>,
    pub error_message: Option<String>,
}

impl ParsedFlow {
    pub fn into_flow(self) -> Option<Flow> {
        self.flow
    }
}

/// Decode one source and build its flow.
pub fn parse_source(uri: &str, xml_text: &str) -> Result<Flow, ScanError> {
    let tree = xml::decode(xml_text)?;
    Ok(Flow::parse(uri, tree))
}

/// Build a flow from an already-decoded tree (the host may bring its own
/// XML decoder).
pub fn parse_tree(uri: &str, tree: serde_json::Value) -> Flow {
    Flow::parse(uri, tree)
}

/// Parse a batch of `(uri, xml_text)` sources. A source that fails to decode
/// yields a `ParsedFlow` carrying the error instead of aborting the batch.
pub fn parse_flows<'a, I>(sources: I) -> Vec<ParsedFlow>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    sources
        .into_iter()
        .map(|(uri, text)| match parse_source(uri, text) {
            Ok(flow) => ParsedFlow {
                uri: uri.to_string(),
                flow: Some(flow),
                error_message: None,
            },
            Err(e) => {
                tracing::warn!(uri, error = %e, "failed to parse flow source");
                ParsedFlow {
                    uri: uri.to_string(),
                    flow: None,
                    error_message: Some(e.to_string()),
                }
            }
        })
        .collect()
}
