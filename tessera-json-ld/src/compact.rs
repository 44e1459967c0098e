//! Document and IRI compaction
//!
//! The inverse of expansion: rewrites expanded nodes back into compact
//! form under a supplied context. Term selection runs off an inverse
//! context built once per call, ranking candidate terms by specificity:
//! container match beats type/language match beats shorter term, with
//! lexicographic order as the final tiebreak.

use crate::context::{ActiveContext, Container, TermDefinition, TypeMapping};
use crate::error::Result;
use crate::node::{ExpandedNode, GraphObject, NodeObject, ValueObject};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashMap;

/// Compact an IRI using @vocab rules (property and type positions)
pub fn compact_iri(iri: &str, active: &ActiveContext) -> String {
    IriCompactor::new(active).compact_vocab(iri)
}

/// Compact an IRI for an @id position
///
/// @vocab must not shorten node identifiers; only explicit prefix terms
/// and @base may.
pub fn compact_iri_id(iri: &str, active: &ActiveContext) -> String {
    IriCompactor::new(active).compact_id(iri)
}

/// Compact a whole expanded document under a context expression
///
/// The context reattaches at the root only; no nested `@context` is ever
/// produced. A single-node document compacts to an object, anything else
/// to a `@graph` wrapper.
pub fn compact_document(expanded: &[ExpandedNode], context: &JsonValue) -> Result<JsonValue> {
    let active = ActiveContext::new().parse(context)?;
    let compactor = Compactor::new(&active);

    let items: Vec<JsonValue> = expanded
        .iter()
        .map(|node| compactor.compact_item(node, None))
        .collect();

    let has_context = !matches!(context, JsonValue::Null)
        && !matches!(context, JsonValue::Object(m) if m.is_empty());

    let mut root = Map::new();
    if has_context {
        root.insert("@context".to_string(), context.clone());
    }

    match <[JsonValue; 1]>::try_from(items) {
        Ok([single]) if single.is_object() => {
            if !has_context {
                return Ok(single);
            }
            if let JsonValue::Object(obj) = single {
                for (k, v) in obj {
                    root.insert(k, v);
                }
            }
            Ok(JsonValue::Object(root))
        }
        Ok([single]) => Ok(single),
        Err(items) => {
            // Nothing survived expansion: no @graph key, just the root.
            if items.is_empty() {
                return Ok(JsonValue::Object(root));
            }
            if !has_context {
                return Ok(JsonValue::Array(items));
            }
            root.insert("@graph".to_string(), JsonValue::Array(items));
            Ok(JsonValue::Object(root))
        }
    }
}

/// Reverse lookup tables for IRI-to-term compaction
///
/// Namespace entries sort longest-first so the most specific prefix wins
/// and every IRI gets its shortest compact form.
struct IriCompactor {
    exact: HashMap<String, String>,
    prefixes: Vec<(String, String)>,
    vocab: Option<String>,
    base: Option<String>,
}

impl IriCompactor {
    fn new(active: &ActiveContext) -> Self {
        let mut exact: HashMap<String, String> = HashMap::new();
        for (term, def) in &active.terms {
            if def.reverse.is_some() {
                continue;
            }
            let Some(ref iri) = def.iri else { continue };
            if iri.starts_with('@') {
                continue;
            }
            match exact.get(iri.as_str()) {
                Some(existing) if shorter(existing, term) => {}
                _ => {
                    exact.insert(iri.clone(), term.clone());
                }
            }
        }

        let mut prefixes: Vec<(String, String)> = exact
            .iter()
            .filter(|(iri, _)| iri.ends_with('/') || iri.ends_with('#'))
            .map(|(iri, term)| (iri.clone(), term.clone()))
            .collect();
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.1.cmp(&b.1)));

        Self {
            exact,
            prefixes,
            vocab: active.vocab.clone(),
            base: active.base.clone(),
        }
    }

    fn compact_vocab(&self, iri: &str) -> String {
        if let Some(term) = self.exact.get(iri) {
            return term.clone();
        }
        if let Some(ref vocab) = self.vocab {
            if let Some(suffix) = iri.strip_prefix(vocab.as_str()) {
                if !suffix.is_empty() {
                    return suffix.to_string();
                }
            }
        }
        for (prefix_iri, term) in &self.prefixes {
            if let Some(suffix) = iri.strip_prefix(prefix_iri.as_str()) {
                if !suffix.is_empty() {
                    return format!("{}:{}", term, suffix);
                }
            }
        }
        iri.to_string()
    }

    fn compact_id(&self, iri: &str) -> String {
        if iri.starts_with("_:") {
            return iri.to_string();
        }
        for (prefix_iri, term) in &self.prefixes {
            if let Some(suffix) = iri.strip_prefix(prefix_iri.as_str()) {
                if !suffix.is_empty() {
                    return format!("{}:{}", term, suffix);
                }
            }
        }
        if let Some(ref base) = self.base {
            if let Some(suffix) = iri.strip_prefix(base.as_str()) {
                if !suffix.is_empty() {
                    return suffix.trim_start_matches('/').to_string();
                }
            }
        }
        iri.to_string()
    }
}

fn shorter(a: &str, b: &str) -> bool {
    (a.len(), a) <= (b.len(), b)
}

/// One candidate term in the inverse context
struct InverseEntry {
    term: String,
    def: TermDefinition,
}

struct Compactor<'a> {
    active: &'a ActiveContext,
    iris: IriCompactor,
    /// IRI -> candidate terms, sorted by (length, lexicographic)
    inverse: HashMap<String, Vec<InverseEntry>>,
}

impl<'a> Compactor<'a> {
    fn new(active: &'a ActiveContext) -> Self {
        let mut inverse: HashMap<String, Vec<InverseEntry>> = HashMap::new();
        for (term, def) in &active.terms {
            let Some(ref iri) = def.iri else { continue };
            if iri.starts_with('@') || def.reverse.is_some() {
                continue;
            }
            inverse.entry(iri.clone()).or_default().push(InverseEntry {
                term: term.clone(),
                def: def.clone(),
            });
        }
        for entries in inverse.values_mut() {
            entries.sort_by(|a, b| {
                (a.term.len(), a.term.as_str()).cmp(&(b.term.len(), b.term.as_str()))
            });
        }

        Self {
            active,
            iris: IriCompactor::new(active),
            inverse,
        }
    }

    /// Pick the most specific term for a predicate given its values
    fn select_term(&self, iri: &str, values: &[ExpandedNode]) -> Option<&InverseEntry> {
        let entries = self.inverse.get(iri)?;
        let mut best: Option<(u8, &InverseEntry)> = None;
        for entry in entries {
            let Some(score) = score_entry(entry, values, self.active) else {
                continue;
            };
            // Entries are pre-sorted, so strictly-greater keeps the
            // shortest term among equal scores.
            if best.map_or(true, |(b, _)| score > b) {
                best = Some((score, entry));
            }
        }
        best.map(|(_, e)| e)
    }

    fn compact_item(&self, item: &ExpandedNode, def: Option<&TermDefinition>) -> JsonValue {
        match item {
            ExpandedNode::Node(node) => self.compact_node(node, def),
            ExpandedNode::Value(value) => self.compact_value(value, def),
            ExpandedNode::List(items) => {
                let compacted: Vec<JsonValue> =
                    items.iter().map(|i| self.compact_item(i, def)).collect();
                if def.is_some_and(|d| d.has_container(Container::List)) {
                    JsonValue::Array(compacted)
                } else {
                    json!({"@list": compacted})
                }
            }
            ExpandedNode::Graph(graph) => self.compact_graph(graph),
        }
    }

    fn compact_graph(&self, graph: &GraphObject) -> JsonValue {
        let mut obj = Map::new();
        if let Some(ref id) = graph.id {
            obj.insert("@id".to_string(), json!(self.iris.compact_id(id)));
        }
        obj.insert(
            "@graph".to_string(),
            JsonValue::Array(
                graph
                    .nodes
                    .iter()
                    .map(|n| self.compact_item(n, None))
                    .collect(),
            ),
        );
        JsonValue::Object(obj)
    }

    fn compact_node(&self, node: &NodeObject, def: Option<&TermDefinition>) -> JsonValue {
        // A bare reference under an @id-coercing term collapses to a string.
        if node.is_empty() && node.index.is_none() {
            if let Some(ref id) = node.id {
                let compacted = self.iris.compact_id(id);
                if matches!(
                    def.and_then(|d| d.type_mapping.as_ref()),
                    Some(TypeMapping::Id) | Some(TypeMapping::Vocab)
                ) {
                    return json!(compacted);
                }
                return json!({"@id": compacted});
            }
        }

        let mut obj = Map::new();
        if let Some(ref id) = node.id {
            obj.insert("@id".to_string(), json!(self.iris.compact_id(id)));
        }
        if !node.types.is_empty() {
            let types: Vec<JsonValue> = node
                .types
                .iter()
                .map(|t| json!(self.iris.compact_vocab(t)))
                .collect();
            let value = if types.len() == 1 {
                types.into_iter().next().unwrap_or(JsonValue::Null)
            } else {
                JsonValue::Array(types)
            };
            obj.insert("@type".to_string(), value);
        }
        if let Some(ref index) = node.index {
            obj.insert("@index".to_string(), json!(index));
        }

        for (predicate, values) in &node.properties {
            let selected = self.select_term(predicate, values);
            let (key, term_def) = match selected {
                Some(entry) => (entry.term.clone(), Some(&entry.def)),
                None => (self.iris.compact_vocab(predicate), None),
            };

            let mut compacted: Vec<JsonValue> = values
                .iter()
                .map(|v| self.compact_item(v, term_def))
                .collect();

            // Only @set forces an array here; a list under an @list term is
            // already a bare array and must not be wrapped again.
            let keep_array = term_def.is_some_and(|d| d.has_container(Container::Set));
            let value = if compacted.len() == 1 && !keep_array {
                compacted.remove(0)
            } else {
                JsonValue::Array(compacted)
            };
            obj.insert(key, value);
        }

        if !node.reverse.is_empty() {
            let mut rev = Map::new();
            for (predicate, values) in &node.reverse {
                let mut compacted: Vec<JsonValue> = values
                    .iter()
                    .map(|v| self.compact_item(v, None))
                    .collect();
                let value = if compacted.len() == 1 {
                    compacted.remove(0)
                } else {
                    JsonValue::Array(compacted)
                };
                rev.insert(self.iris.compact_vocab(predicate), value);
            }
            obj.insert("@reverse".to_string(), JsonValue::Object(rev));
        }

        JsonValue::Object(obj)
    }

    fn compact_value(&self, value: &ValueObject, def: Option<&TermDefinition>) -> JsonValue {
        let type_mapping = def.and_then(|d| d.type_mapping.as_ref());

        if value.datatype.as_deref() == Some("@json") {
            if matches!(type_mapping, Some(TypeMapping::Json)) {
                return value.value.clone();
            }
            return json!({"@value": value.value, "@type": "@json"});
        }

        if let Some(ref dt) = value.datatype {
            if matches!(type_mapping, Some(TypeMapping::Iri(t)) if t == dt) {
                return value.value.clone();
            }
            return json!({
                "@value": value.value,
                "@type": self.iris.compact_vocab(dt)
            });
        }

        if let Some(ref lang) = value.language {
            let effective = match def.and_then(|d| d.language.as_ref()) {
                Some(override_lang) => override_lang.as_deref(),
                None => self.active.language.as_deref(),
            };
            if effective == Some(lang.as_str()) {
                return value.value.clone();
            }
            return json!({"@value": value.value, "@language": lang});
        }

        // Plain value: bare unless a default language would reinterpret
        // a bare string on re-expansion.
        if value.value.is_string() {
            let effective = match def.and_then(|d| d.language.as_ref()) {
                Some(override_lang) => override_lang.as_deref(),
                None => self.active.language.as_deref(),
            };
            if effective.is_some() {
                return json!({"@value": value.value, "@language": null});
            }
        }
        value.value.clone()
    }
}

/// Compatibility-then-specificity score; None means the term would
/// change the statement's meaning and must not be selected.
fn score_entry(entry: &InverseEntry, values: &[ExpandedNode], active: &ActiveContext) -> Option<u8> {
    let def = &entry.def;

    let all_lists = values.iter().all(|v| matches!(v, ExpandedNode::List(_)));
    let all_refs = values
        .iter()
        .all(|v| matches!(v, ExpandedNode::Node(n) if n.is_empty() && n.id.is_some()));

    if def.has_container(Container::List) && !all_lists {
        return None;
    }
    if def.has_container(Container::Language)
        && !values
            .iter()
            .all(|v| matches!(v, ExpandedNode::Value(val) if val.language.is_some()))
    {
        return None;
    }

    let type_lang_match = match def.type_mapping.as_ref() {
        Some(TypeMapping::Iri(dt)) => {
            let ok = values
                .iter()
                .all(|v| matches!(v, ExpandedNode::Value(val) if val.datatype.as_deref() == Some(dt.as_str())));
            if !ok {
                return None;
            }
            true
        }
        Some(TypeMapping::Id) | Some(TypeMapping::Vocab) => {
            if !all_refs {
                return None;
            }
            true
        }
        Some(TypeMapping::Json) => {
            let ok = values.iter().all(
                |v| matches!(v, ExpandedNode::Value(val) if val.datatype.as_deref() == Some("@json")),
            );
            if !ok {
                return None;
            }
            true
        }
        None => match def.language.as_ref() {
            Some(lang) => {
                let ok = values.iter().all(|v| {
                    matches!(v, ExpandedNode::Value(val) if val.language.as_deref() == lang.as_deref()
                        && val.datatype.is_none())
                });
                if !ok {
                    return None;
                }
                true
            }
            None => {
                // A term with no coercion misstates nothing, but typed or
                // foreign-language values read differently under a default
                // language.
                let neutral = values.iter().all(|v| match v {
                    ExpandedNode::Value(val) => {
                        val.datatype.is_none()
                            && (val.language.is_none()
                                || val.language.as_deref() == active.language.as_deref())
                    }
                    _ => true,
                });
                if !neutral {
                    return None;
                }
                false
            }
        },
    };

    let container_match = (def.has_container(Container::List) && all_lists)
        || (def.has_container(Container::Set) && values.len() > 1)
        || (def.has_container(Container::Language));

    Some((container_match as u8) * 2 + (type_lang_match as u8))
}
