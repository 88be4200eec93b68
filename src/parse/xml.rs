//! XML → generic value-tree decoder.
//!
//! The scanner core interprets a decoded key/value tree, not raw XML. This
//! module is the thin boundary that produces that tree: elements become JSON
//! objects, repeated sibling tags collapse into arrays, leaf elements with
//! only text become strings, and XML attributes land under `@`-prefixed keys
//! (which the flow parser ignores).

use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::{Map, Value};

use crate::error::ScanError;

/// Decode an XML document into a value tree rooted at the document element,
/// e.g. `{"Flow": {...}}`.
pub fn decode(xml: &str) -> Result<Value, ScanError> {
    let mut reader = Reader::from_str(xml);

    // (tag, child map, accumulated text) per open element
    let mut stack: Vec<(String, Map<String, Value>, String)> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let mut children = Map::new();
                for attr in e.attributes().flatten() {
                    let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
                    let val = String::from_utf8_lossy(&attr.value).to_string();
                    children.insert(key, Value::String(val));
                }
                stack.push((name, children, String::new()));
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let mut children = Map::new();
                for attr in e.attributes().flatten() {
                    let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
                    let val = String::from_utf8_lossy(&attr.value).to_string();
                    children.insert(key, Value::String(val));
                }
                let value = finish_element(children, String::new());
                attach(&mut stack, &mut root, name, value);
            }
            Ok(Event::Text(t)) => {
                if let Some((_, _, text)) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(t.as_ref());
                    match quick_xml::escape::unescape(&raw) {
                        Ok(unescaped) => text.push_str(&unescaped),
                        Err(_) => text.push_str(&raw),
                    }
                }
            }
            Ok(Event::CData(t)) => {
                if let Some((_, _, text)) = stack.last_mut() {
                    let bytes = t.into_inner();
                    text.push_str(&String::from_utf8_lossy(&bytes));
                }
            }
            Ok(Event::End(_)) => {
                // quick-xml rejects mismatched tags before we get here
                if let Some((name, children, text)) = stack.pop() {
                    let value = finish_element(children, text);
                    attach(&mut stack, &mut root, name, value);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ScanError::Xml(e.to_string())),
        }
    }

    match root {
        Some((name, value)) => {
            let mut doc = Map::new();
            doc.insert(name, value);
            Ok(Value::Object(doc))
        }
        None => Err(ScanError::Xml("empty document".into())),
    }
}

fn finish_element(children: Map<String, Value>, text: String) -> Value {
    if children.is_empty() {
        Value::String(text.trim().to_string())
    } else {
        // mixed content is not part of the schema; text around children is dropped
        Value::Object(children)
    }
}

/// Insert a completed child into its parent, promoting repeated tags to arrays.
fn attach(
    stack: &mut [(String, Map<String, Value>, String)],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) {
    if let Some((_, parent, _)) = stack.last_mut() {
        match parent.remove(&name) {
            Some(Value::Array(mut entries)) => {
                entries.push(value);
                parent.insert(name, Value::Array(entries));
            }
            Some(first) => {
                parent.insert(name, Value::Array(vec![first, value]));
            }
            None => {
                parent.insert(name, value);
            }
        }
    } else if root.is_none() {
        *root = Some((name, value));
    }
}

/// Read a scalar as a string, tolerating trees built from JSON in tests where
/// numbers and booleans appear untyped.
pub(crate) fn value_str(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Iterate an optional tree entry that may be a single object or an array.
pub(crate) fn iter_entries(value: Option<&Value>) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Some(Value::Array(entries)) => Box::new(entries.iter()),
        Some(single) => Box::new(std::iter::once(single)),
        None => Box::new(std::iter::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_tags_become_arrays() {
        let tree = decode(
            "<Flow><variables><name>a</name></variables><variables><name>b</name></variables></Flow>",
        )
        .unwrap();
        let vars = &tree["Flow"]["variables"];
        assert!(vars.is_array());
        assert_eq!(vars[0]["name"], "a");
        assert_eq!(vars[1]["name"], "b");
    }

    #[test]
    fn leaf_text_becomes_string() {
        let tree = decode("<Flow><label>My Flow</label></Flow>").unwrap();
        assert_eq!(tree["Flow"]["label"], "My Flow");
    }

    #[test]
    fn attributes_are_prefixed() {
        let tree = decode(r#"<Flow xmlns="urn:x"><status>Active</status></Flow>"#).unwrap();
        assert_eq!(tree["Flow"]["@xmlns"], "urn:x");
    }

    #[test]
    fn entities_are_unescaped() {
        let tree = decode("<Flow><label>a &amp; b</label></Flow>").unwrap();
        assert_eq!(tree["Flow"]["label"], "a & b");
    }

    #[test]
    fn truncated_document_is_an_error() {
        assert!(decode("<Flow><label>oops</Flow>").is_err());
    }
}
