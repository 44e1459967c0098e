//! Expanded document representation
//!
//! Expansion output is a closed tagged enum rather than raw JSON: every
//! value is classified exactly once, at the boundary, and downstream
//! stages match on variants instead of re-inspecting maps for keywords.

use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;

/// One item of an expanded document
#[derive(Clone, Debug, PartialEq)]
pub enum ExpandedNode {
    /// A node object (has identity, types, and properties)
    Node(NodeObject),
    /// A value object (a literal)
    Value(ValueObject),
    /// An ordered list
    List(Vec<ExpandedNode>),
    /// A named or anonymous graph
    Graph(GraphObject),
}

/// A node object in expanded form
///
/// Properties use a `BTreeMap` so iteration order (and therefore quad
/// extraction order and rendered JSON) is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeObject {
    /// Node identifier: an IRI or a `_:`-prefixed blank node label
    pub id: Option<String>,
    /// Type IRIs, document order preserved
    pub types: Vec<String>,
    /// Predicate IRI -> values
    pub properties: BTreeMap<String, Vec<ExpandedNode>>,
    /// Reverse predicate IRI -> subject nodes
    pub reverse: BTreeMap<String, Vec<ExpandedNode>>,
    /// @index annotation
    pub index: Option<String>,
}

impl NodeObject {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.properties.is_empty() && self.reverse.is_empty()
    }

    pub fn add(&mut self, predicate: impl Into<String>, value: ExpandedNode) {
        self.properties.entry(predicate.into()).or_default().push(value);
    }
}

/// A literal value in expanded form
///
/// `datatype` and `language` are mutually exclusive; the expander
/// enforces this before constructing one. A datatype of `"@json"` marks
/// an rdf:JSON literal whose `value` may be arbitrary JSON.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueObject {
    pub value: JsonValue,
    pub datatype: Option<String>,
    pub language: Option<String>,
    pub index: Option<String>,
}

impl ValueObject {
    pub fn plain(value: JsonValue) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn typed(value: JsonValue, datatype: impl Into<String>) -> Self {
        Self {
            value,
            datatype: Some(datatype.into()),
            ..Self::default()
        }
    }

    pub fn tagged(value: JsonValue, language: impl Into<String>) -> Self {
        Self {
            value,
            language: Some(language.into()),
            ..Self::default()
        }
    }
}

/// A graph object: a set of nodes under an optional graph name
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphObject {
    pub id: Option<String>,
    pub nodes: Vec<ExpandedNode>,
}

impl ExpandedNode {
    pub fn as_node(&self) -> Option<&NodeObject> {
        match self {
            ExpandedNode::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&ValueObject> {
        match self {
            ExpandedNode::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Render W3C expanded document form
    pub fn to_json(&self) -> JsonValue {
        match self {
            ExpandedNode::Node(node) => node_to_json(node),
            ExpandedNode::Value(value) => value_to_json(value),
            ExpandedNode::List(items) => {
                json!({"@list": items.iter().map(ExpandedNode::to_json).collect::<Vec<_>>()})
            }
            ExpandedNode::Graph(graph) => {
                let mut obj = Map::new();
                if let Some(ref id) = graph.id {
                    obj.insert("@id".to_string(), json!(id));
                }
                obj.insert(
                    "@graph".to_string(),
                    JsonValue::Array(graph.nodes.iter().map(ExpandedNode::to_json).collect()),
                );
                JsonValue::Object(obj)
            }
        }
    }
}

fn node_to_json(node: &NodeObject) -> JsonValue {
    let mut obj = Map::new();
    if let Some(ref id) = node.id {
        obj.insert("@id".to_string(), json!(id));
    }
    if !node.types.is_empty() {
        obj.insert("@type".to_string(), json!(node.types));
    }
    if let Some(ref index) = node.index {
        obj.insert("@index".to_string(), json!(index));
    }
    for (predicate, values) in &node.properties {
        obj.insert(
            predicate.clone(),
            JsonValue::Array(values.iter().map(ExpandedNode::to_json).collect()),
        );
    }
    if !node.reverse.is_empty() {
        let mut rev = Map::new();
        for (predicate, values) in &node.reverse {
            rev.insert(
                predicate.clone(),
                JsonValue::Array(values.iter().map(ExpandedNode::to_json).collect()),
            );
        }
        obj.insert("@reverse".to_string(), JsonValue::Object(rev));
    }
    JsonValue::Object(obj)
}

fn value_to_json(value: &ValueObject) -> JsonValue {
    let mut obj = Map::new();
    obj.insert("@value".to_string(), value.value.clone());
    if let Some(ref dt) = value.datatype {
        obj.insert("@type".to_string(), json!(dt));
    }
    if let Some(ref lang) = value.language {
        obj.insert("@language".to_string(), json!(lang));
    }
    if let Some(ref index) = value.index {
        obj.insert("@index".to_string(), json!(index));
    }
    JsonValue::Object(obj)
}

/// Render a whole expanded document (always a top-level array)
pub fn to_json(nodes: &[ExpandedNode]) -> JsonValue {
    JsonValue::Array(nodes.iter().map(ExpandedNode::to_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_node_to_json() {
        let mut node = NodeObject {
            id: Some("http://example.org/1".to_string()),
            types: vec!["http://schema.org/Person".to_string()],
            ..NodeObject::default()
        };
        node.add(
            "http://schema.org/name",
            ExpandedNode::Value(ValueObject::plain(json!("Alice"))),
        );

        assert_eq!(
            ExpandedNode::Node(node).to_json(),
            json!({
                "@id": "http://example.org/1",
                "@type": ["http://schema.org/Person"],
                "http://schema.org/name": [{"@value": "Alice"}]
            })
        );
    }

    #[test]
    fn test_value_variants_to_json() {
        assert_eq!(
            ExpandedNode::Value(ValueObject::tagged(json!("bonjour"), "fr")).to_json(),
            json!({"@value": "bonjour", "@language": "fr"})
        );
        assert_eq!(
            ExpandedNode::Value(ValueObject::typed(
                json!("2011-04-09"),
                "http://www.w3.org/2001/XMLSchema#date"
            ))
            .to_json(),
            json!({"@value": "2011-04-09", "@type": "http://www.w3.org/2001/XMLSchema#date"})
        );
    }

    #[test]
    fn test_list_to_json() {
        let list = ExpandedNode::List(vec![
            ExpandedNode::Value(ValueObject::plain(json!("a"))),
            ExpandedNode::Value(ValueObject::plain(json!("b"))),
        ]);
        assert_eq!(
            list.to_json(),
            json!({"@list": [{"@value": "a"}, {"@value": "b"}]})
        );
    }
}
