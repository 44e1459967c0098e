//! Quad extraction from expanded documents
//!
//! Walks an expanded document and emits RDF quads. Blank node labels from
//! the input (`_:x`) are relabeled through a per-call cache so identity is
//! preserved within one extraction but fresh labels never collide with
//! input labels. Lists lower to `rdf:first`/`rdf:rest` chains terminated
//! by `rdf:nil`.

use crate::node::{ExpandedNode, NodeObject, ValueObject};
use crate::normalize::canonical_json;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tessera_graph_ir::{Quad, QuadSet, Term};
use tessera_vocab::{rdf, xsd};

/// Extract the quads stated by an expanded document
pub fn to_quads(nodes: &[ExpandedNode]) -> QuadSet {
    let mut extractor = QuadExtractor::default();
    for node in nodes {
        match node {
            // A top-level graph object without a name is the default graph.
            ExpandedNode::Graph(g) if g.id.is_none() => {
                for inner in &g.nodes {
                    extractor.process(inner, None);
                }
            }
            other => {
                extractor.process(other, None);
            }
        }
    }
    let mut quads = extractor.quads;
    quads.dedupe();
    quads
}

#[derive(Default)]
struct QuadExtractor {
    quads: QuadSet,
    counter: usize,
    labels: HashMap<String, String>,
}

impl QuadExtractor {
    fn fresh_blank(&mut self) -> Term {
        let term = Term::blank(format!("b{}", self.counter));
        self.counter += 1;
        term
    }

    /// Map an input `_:` label to an issued label, stable within this call
    fn relabel(&mut self, label: &str) -> Term {
        let bare = label.strip_prefix("_:").unwrap_or(label);
        if let Some(issued) = self.labels.get(bare) {
            return Term::blank(issued);
        }
        let issued = format!("b{}", self.counter);
        self.counter += 1;
        self.labels.insert(bare.to_string(), issued.clone());
        Term::blank(issued)
    }

    fn subject_term(&mut self, node: &NodeObject) -> Term {
        match node.id {
            Some(ref id) if id.starts_with("_:") => self.relabel(id),
            Some(ref id) => Term::iri(id),
            None => self.fresh_blank(),
        }
    }

    fn graph_name(&mut self, id: Option<&str>) -> Option<Term> {
        id.map(|id| {
            if id.starts_with("_:") {
                self.relabel(id)
            } else {
                Term::iri(id)
            }
        })
    }

    /// Emit quads for one item; returns the term standing for it in
    /// object position, if it has one.
    fn process(&mut self, item: &ExpandedNode, graph: Option<&Term>) -> Option<Term> {
        match item {
            ExpandedNode::Node(node) => Some(self.process_node(node, graph)),
            ExpandedNode::Value(value) => Some(literal_term(value)),
            ExpandedNode::List(items) => Some(self.process_list(items, graph)),
            ExpandedNode::Graph(g) => {
                // An unnamed graph in object position gets a fresh blank
                // node as its name so the edge pointing at it survives.
                let name = self
                    .graph_name(g.id.as_deref())
                    .or_else(|| Some(self.fresh_blank()));
                for inner in &g.nodes {
                    self.process(inner, name.as_ref());
                }
                name
            }
        }
    }

    fn process_node(&mut self, node: &NodeObject, graph: Option<&Term>) -> Term {
        let subject = self.subject_term(node);

        for type_iri in &node.types {
            self.emit(
                subject.clone(),
                Term::iri(rdf::TYPE),
                Term::iri(type_iri),
                graph,
            );
        }

        for (predicate, values) in &node.properties {
            let p = Term::iri(predicate);
            for value in values {
                if let Some(object) = self.process(value, graph) {
                    self.emit(subject.clone(), p.clone(), object, graph);
                }
            }
        }

        // Reversed statements point at this node.
        for (predicate, values) in &node.reverse {
            let p = Term::iri(predicate);
            for value in values {
                if let Some(reversed_subject) = self.process(value, graph) {
                    self.emit(reversed_subject, p.clone(), subject.clone(), graph);
                }
            }
        }

        subject
    }

    /// Lower a list to a well-formed RDF collection
    fn process_list(&mut self, items: &[ExpandedNode], graph: Option<&Term>) -> Term {
        let terms: Vec<Term> = items
            .iter()
            .filter_map(|item| self.process(item, graph))
            .collect();

        let mut rest = Term::iri(rdf::NIL);
        for term in terms.into_iter().rev() {
            let cell = self.fresh_blank();
            self.emit(cell.clone(), Term::iri(rdf::FIRST), term, graph);
            self.emit(cell.clone(), Term::iri(rdf::REST), rest, graph);
            rest = cell;
        }
        rest
    }

    fn emit(&mut self, s: Term, p: Term, o: Term, graph: Option<&Term>) {
        self.quads.add(Quad::new(s, p, o, graph.cloned()));
    }
}

/// Coerce an expanded value object to an RDF literal term
fn literal_term(value: &ValueObject) -> Term {
    if value.datatype.as_deref() == Some("@json") {
        return Term::typed(canonical_json(&value.value), rdf::JSON);
    }

    if let Some(ref lang) = value.language {
        let lexical = value.value.as_str().unwrap_or_default();
        return Term::lang_string(lexical, lang);
    }

    match &value.value {
        JsonValue::String(s) => {
            Term::typed(s, value.datatype.as_deref().unwrap_or(xsd::STRING))
        }
        JsonValue::Bool(b) => {
            let lexical = if *b { "true" } else { "false" };
            Term::typed(lexical, value.datatype.as_deref().unwrap_or(xsd::BOOLEAN))
        }
        JsonValue::Number(n) => {
            if let Some(ref dt) = value.datatype {
                Term::typed(number_lexical(n), dt)
            } else if n.is_f64() {
                let lexical = n
                    .as_f64()
                    .map(canonical_double)
                    .unwrap_or_else(|| n.to_string());
                Term::typed(lexical, xsd::DOUBLE)
            } else {
                Term::typed(n.to_string(), xsd::INTEGER)
            }
        }
        other => Term::typed(canonical_json(other), rdf::JSON),
    }
}

fn number_lexical(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => canonical_double(f),
        _ => n.to_string(),
    }
}

/// XSD canonical double form: mantissa with a decimal point, `E` exponent
fn canonical_double(f: f64) -> String {
    let rendered = format!("{:E}", f);
    match rendered.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{}.0E{}", mantissa, exponent)
        }
        _ => rendered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ActiveContext;
    use crate::expand::expand_document;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tessera_graph_ir::nquads;

    fn quads_for(doc: &serde_json::Value) -> QuadSet {
        let expanded = expand_document(doc, &ActiveContext::new()).unwrap();
        to_quads(&expanded)
    }

    #[test]
    fn test_simple_node() {
        let quads = quads_for(&json!({
            "@id": "http://example.org/alice",
            "@type": "http://schema.org/Person",
            "http://schema.org/name": "Alice"
        }));
        let text = nquads::serialize(&quads);
        assert_eq!(
            text,
            "<http://example.org/alice> <http://schema.org/name> \"Alice\" .\n\
             <http://example.org/alice> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Person> .\n"
        );
    }

    #[test]
    fn test_blank_label_identity_preserved() {
        let quads = quads_for(&json!([
            {"@id": "_:me", "http://schema.org/name": "Alice"},
            {"@id": "_:me", "http://schema.org/age": 30}
        ]));
        assert_eq!(quads.blank_labels().len(), 1);
    }

    #[test]
    fn test_embedded_node_gets_fresh_blank() {
        let quads = quads_for(&json!({
            "@id": "http://example.org/1",
            "http://schema.org/knows": {"http://schema.org/name": "Bob"}
        }));
        // One edge to the blank node, one name statement from it.
        assert_eq!(quads.len(), 2);
        assert_eq!(quads.blank_labels().len(), 1);
    }

    #[test]
    fn test_list_lowering() {
        let quads = quads_for(&json!({
            "@id": "http://example.org/1",
            "http://example.org/letters": {"@list": ["a", "b"]}
        }));
        let text = nquads::serialize(&quads);
        // Two cells, each with first+rest, plus the head edge.
        assert_eq!(quads.len(), 5);
        assert!(text.contains(rdf::FIRST));
        assert!(text.contains(rdf::NIL));
    }

    #[test]
    fn test_empty_list_is_nil() {
        let quads = quads_for(&json!({
            "@id": "http://example.org/1",
            "http://example.org/letters": {"@list": []}
        }));
        let text = nquads::serialize(&quads);
        assert_eq!(
            text,
            "<http://example.org/1> <http://example.org/letters> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil> .\n"
        );
    }

    #[test]
    fn test_named_graph() {
        let quads = quads_for(&json!({
            "@id": "http://example.org/g1",
            "@graph": [
                {"@id": "http://example.org/1", "http://schema.org/name": "Alice"}
            ]
        }));
        let text = nquads::serialize(&quads);
        assert_eq!(
            text,
            "<http://example.org/1> <http://schema.org/name> \"Alice\" <http://example.org/g1> .\n"
        );
    }

    #[test]
    fn test_graph_container_names_anonymous_graph() {
        let quads = quads_for(&json!({
            "@context": {
                "claims": {"@id": "http://example.org/claims", "@container": "@graph"}
            },
            "@id": "http://example.org/s",
            "claims": {"http://example.org/p": "v"}
        }));
        assert_eq!(quads.len(), 2);

        // The edge to the graph lands in the default graph and points at
        // the blank node naming it.
        let edge = quads
            .iter()
            .find(|q| q.p.as_iri() == Some("http://example.org/claims"))
            .unwrap();
        assert_eq!(edge.g, None);
        let graph_label = edge.o.as_blank().unwrap();

        let inner = quads
            .iter()
            .find(|q| q.p.as_iri() == Some("http://example.org/p"))
            .unwrap();
        assert_eq!(
            inner.g.as_ref().and_then(|g| g.as_blank()),
            Some(graph_label)
        );
    }

    #[test]
    fn test_top_level_graph_wrapper_is_default_graph() {
        let quads = quads_for(&json!({
            "@graph": [
                {"@id": "http://example.org/1", "http://schema.org/name": "Alice"}
            ]
        }));
        let text = nquads::serialize(&quads);
        assert_eq!(
            text,
            "<http://example.org/1> <http://schema.org/name> \"Alice\" .\n"
        );
    }

    #[test]
    fn test_literal_coercions() {
        let quads = quads_for(&json!({
            "@id": "http://example.org/1",
            "http://example.org/count": 42,
            "http://example.org/score": 4.5,
            "http://example.org/flag": true,
            "http://example.org/greeting": {"@value": "bonjour", "@language": "fr"}
        }));
        let text = nquads::serialize(&quads);
        assert!(text.contains("\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"));
        assert!(text.contains("\"4.5E0\"^^<http://www.w3.org/2001/XMLSchema#double>"));
        assert!(text.contains("\"true\"^^<http://www.w3.org/2001/XMLSchema#boolean>"));
        assert!(text.contains("\"bonjour\"@fr"));
    }

    #[test]
    fn test_json_literal_canonical_lexical() {
        let quads = quads_for(&json!({
            "@context": {"blob": {"@id": "http://example.org/blob", "@type": "@json"}},
            "@id": "http://example.org/1",
            "blob": {"b": 2, "a": 1}
        }));
        let text = nquads::serialize(&quads);
        assert!(text.contains(
            "\"{\\\"a\\\":1,\\\"b\\\":2}\"^^<http://www.w3.org/1999/02/22-rdf-syntax-ns#JSON>"
        ));
    }

    #[test]
    fn test_reverse_inverts_direction() {
        let quads = quads_for(&json!({
            "@context": {
                "derivedWorks": {"@reverse": "http://schema.org/isBasedOn"}
            },
            "@id": "http://example.org/original",
            "derivedWorks": {"@id": "http://example.org/remix"}
        }));
        let text = nquads::serialize(&quads);
        assert_eq!(
            text,
            "<http://example.org/remix> <http://schema.org/isBasedOn> <http://example.org/original> .\n"
        );
    }

    #[test]
    fn test_canonical_double() {
        assert_eq!(canonical_double(4.5), "4.5E0");
        assert_eq!(canonical_double(1000.0), "1.0E3");
        assert_eq!(canonical_double(-0.25), "-2.5E-1");
    }
}
