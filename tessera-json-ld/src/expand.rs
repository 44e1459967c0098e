//! Document expansion
//!
//! Rewrites a JSON-LD document into expanded form: every key an IRI or
//! keyword, every value classified as a node, value, list, or graph
//! ([`ExpandedNode`]). Dropped inputs (null values, free-floating
//! top-level literals) are documented non-errors.

use crate::context::{ActiveContext, Container, TermDefinition, TypeMapping};
use crate::error::{JsonLdError, Result};
use crate::iri;
use crate::node::{ExpandedNode, GraphObject, NodeObject, ValueObject};
use serde_json::{Map, Value as JsonValue};
use tessera_vocab::keyword;

/// Expand a single IRI, term, compact IRI, or keyword
///
/// `vocab` selects the fallback for plain terms: the @vocab mapping
/// (property and type positions) or the @base IRI (@id positions).
pub fn expand_iri(value: &str, active: &ActiveContext, vocab: bool) -> String {
    details(value, active, vocab).0
}

/// Expand an IRI and surface the matched term definition, if any
pub fn details(
    value: &str,
    active: &ActiveContext,
    vocab: bool,
) -> (String, Option<TermDefinition>) {
    // Blank node labels pass through every stage untouched.
    if value.starts_with("_:") {
        return (value.to_string(), None);
    }

    // 1. Exact term match (includes keyword aliases).
    if let Some(def) = active.term(value) {
        let expanded = def
            .iri
            .clone()
            .or_else(|| def.reverse.clone())
            .unwrap_or_else(|| value.to_string());
        return (expanded, Some(def.clone()));
    }

    // 2. Keywords pass through.
    if keyword::is_keyword(value) {
        return (value.to_string(), None);
    }

    // 3. Compact IRI prefix match.
    if let Some((prefix, suffix)) = iri::parse_prefix(value) {
        if let Some(def) = active.term(prefix) {
            if let Some(ref prefix_iri) = def.iri {
                return (format!("{}{}", prefix_iri, suffix), None);
            }
        }
    }

    // 4. Vocab or base fallback for plain terms and relative references.
    if !value.starts_with('@') {
        if vocab {
            if !iri::looks_like_iri(value) {
                if let Some(ref vocab_iri) = active.vocab {
                    return (format!("{}{}", vocab_iri, value), None);
                }
            }
        } else if !iri::is_absolute(value) {
            if let Some(ref base) = active.base {
                return (iri::join(base, value), None);
            }
        }
    }

    (value.to_string(), None)
}

/// Expand a whole document
///
/// Returns the top-level array of expanded nodes. Free-floating values
/// and empty node objects at the top level are pruned, never errors.
pub fn expand_document(doc: &JsonValue, active: &ActiveContext) -> Result<Vec<ExpandedNode>> {
    let expanded = match doc {
        JsonValue::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                out.extend(expand_value(item, active, None)?);
            }
            out
        }
        JsonValue::Object(_) => expand_value(doc, active, None)?,
        // A bare scalar has no subject to attach to.
        _ => Vec::new(),
    };

    Ok(expanded.into_iter().filter(keep_at_top_level).collect())
}

/// Top-level pruning: literals and lists cannot float free, and a node
/// carrying nothing but an @id states no fact.
fn keep_at_top_level(node: &ExpandedNode) -> bool {
    match node {
        ExpandedNode::Value(_) | ExpandedNode::List(_) => false,
        ExpandedNode::Node(n) => !n.is_empty(),
        ExpandedNode::Graph(_) => true,
    }
}

/// Expand one value position; always returns zero or more items
fn expand_value(
    value: &JsonValue,
    active: &ActiveContext,
    def: Option<&TermDefinition>,
) -> Result<Vec<ExpandedNode>> {
    // Property-scoped context applies to the whole value.
    let scoped;
    let active = match def.and_then(|d| d.context.as_ref()) {
        Some(raw) => {
            scoped = active.parse(raw)?;
            &scoped
        }
        None => active,
    };

    // A @json coercion captures the value verbatim; maps and arrays get
    // no keyword or container interpretation.
    if let Some(TypeMapping::Json) = def.and_then(|d| d.type_mapping.as_ref()) {
        return Ok(match value {
            JsonValue::Null => Vec::new(),
            other => vec![ExpandedNode::Value(ValueObject::typed(
                other.clone(),
                "@json",
            ))],
        });
    }

    match value {
        JsonValue::Null => Ok(Vec::new()),

        JsonValue::Bool(_) | JsonValue::Number(_) | JsonValue::String(_) => {
            Ok(expand_scalar(value, active, def))
        }

        JsonValue::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                let expanded = expand_value(item, active, def)?;
                if def.is_some_and(|d| d.has_container(Container::List)) {
                    if expanded.iter().any(|e| matches!(e, ExpandedNode::List(_))) {
                        return Err(JsonLdError::ListOfLists);
                    }
                }
                out.extend(expanded);
            }
            if def.is_some_and(|d| d.has_container(Container::List)) {
                return Ok(vec![ExpandedNode::List(out)]);
            }
            Ok(out)
        }

        JsonValue::Object(map) => expand_object(map, active, def),
    }
}

/// Expand a scalar under a term definition
fn expand_scalar(
    value: &JsonValue,
    active: &ActiveContext,
    def: Option<&TermDefinition>,
) -> Vec<ExpandedNode> {
    let type_mapping = def.and_then(|d| d.type_mapping.as_ref());

    if let JsonValue::String(s) = value {
        match type_mapping {
            Some(TypeMapping::Id) => {
                return vec![ExpandedNode::Node(NodeObject {
                    id: Some(expand_iri(s, active, false)),
                    ..NodeObject::default()
                })];
            }
            Some(TypeMapping::Vocab) => {
                return vec![ExpandedNode::Node(NodeObject {
                    id: Some(expand_iri(s, active, true)),
                    ..NodeObject::default()
                })];
            }
            Some(TypeMapping::Iri(dt)) => {
                return vec![ExpandedNode::Value(ValueObject::typed(value.clone(), dt))];
            }
            _ => {}
        }

        // Term language overrides the context default; Some(None) clears.
        let language = match def.and_then(|d| d.language.as_ref()) {
            Some(Some(lang)) => Some(lang.clone()),
            Some(None) => None,
            None => active.language.clone(),
        };
        return vec![ExpandedNode::Value(ValueObject {
            value: value.clone(),
            language,
            ..ValueObject::default()
        })];
    }

    // Booleans and numbers carry an explicit datatype only when coerced.
    let datatype = match type_mapping {
        Some(TypeMapping::Iri(dt)) => Some(dt.clone()),
        _ => None,
    };
    vec![ExpandedNode::Value(ValueObject {
        value: value.clone(),
        datatype,
        ..ValueObject::default()
    })]
}

fn expand_object(
    map: &Map<String, JsonValue>,
    active: &ActiveContext,
    def: Option<&TermDefinition>,
) -> Result<Vec<ExpandedNode>> {
    // Local context first.
    let local;
    let active = match map.get("@context") {
        Some(ctx) => {
            local = active.parse(ctx)?;
            &local
        }
        None => active,
    };

    // Type-scoped contexts: applied for each type value that names a term
    // with a scoped context, in lexicographic order of the raw strings.
    let type_scoped;
    let active = match collect_type_scoped(map, active)? {
        Some(ctx) => {
            type_scoped = ctx;
            &type_scoped
        }
        None => active,
    };

    // Classify keys once.
    let mut entries: Vec<(String, &String, &JsonValue)> = Vec::new();
    for (key, value) in map {
        if key == "@context" {
            continue;
        }
        let (expanded_key, _) = details(key, active, true);
        entries.push((expanded_key, key, value));
    }

    let has = |kw: &str| entries.iter().any(|(k, _, _)| k == kw);

    if has("@value") {
        return expand_value_object(&entries, active, def);
    }
    if has("@list") {
        return expand_list_object(&entries, active, def);
    }
    if has("@set") {
        return expand_set_object(&entries, active, def);
    }
    if has("@graph") {
        return expand_graph_object(&entries, active);
    }

    expand_node_object(&entries, active).map(|node| vec![ExpandedNode::Node(node)])
}

/// Apply scoped contexts attached to the object's type values
fn collect_type_scoped(
    map: &Map<String, JsonValue>,
    active: &ActiveContext,
) -> Result<Option<ActiveContext>> {
    let mut raw_types: Vec<&str> = Vec::new();
    for (key, value) in map {
        let (expanded_key, _) = details(key, active, true);
        if expanded_key != "@type" {
            continue;
        }
        match value {
            JsonValue::String(s) => raw_types.push(s),
            JsonValue::Array(arr) => raw_types.extend(arr.iter().filter_map(|v| v.as_str())),
            _ => {}
        }
    }
    raw_types.sort_unstable();

    let mut result: Option<ActiveContext> = None;
    for t in raw_types {
        if let Some(raw) = active.term(t).and_then(|d| d.context.clone()) {
            let current = result.as_ref().unwrap_or(active);
            result = Some(current.parse(&raw)?);
        }
    }
    Ok(result)
}

fn expand_value_object(
    entries: &[(String, &String, &JsonValue)],
    active: &ActiveContext,
    def: Option<&TermDefinition>,
) -> Result<Vec<ExpandedNode>> {
    let mut result = ValueObject::default();
    let mut value: Option<&JsonValue> = None;

    for (expanded_key, raw_key, v) in entries {
        match expanded_key.as_str() {
            "@value" => value = Some(*v),
            "@type" => match v {
                JsonValue::String(s) => {
                    result.datatype = Some(if s == "@json" {
                        s.clone()
                    } else {
                        expand_iri(s, active, true)
                    });
                }
                other => {
                    return Err(JsonLdError::InvalidTypeValue {
                        message: format!("@type of a value object must be a string, got {}", other),
                    })
                }
            },
            "@language" => match v {
                JsonValue::String(s) => result.language = Some(s.clone()),
                JsonValue::Null => {}
                other => {
                    return Err(JsonLdError::InvalidValueObject {
                        message: format!("@language must be a string, got {}", other),
                    })
                }
            },
            "@index" => {
                result.index = v.as_str().map(|s| s.to_string());
            }
            other => {
                return Err(JsonLdError::InvalidValueObject {
                    message: format!("unexpected entry '{}' (from '{}')", other, raw_key),
                })
            }
        }
    }

    let value = value.unwrap_or(&JsonValue::Null);
    if value.is_null() {
        // {"@value": null} states nothing.
        return Ok(Vec::new());
    }

    if result.datatype.is_some() && result.language.is_some() {
        return Err(JsonLdError::InvalidValueObject {
            message: "@type and @language are mutually exclusive".to_string(),
        });
    }
    if result.datatype.as_deref() != Some("@json") && !is_scalar(value) {
        return Err(JsonLdError::InvalidValueObject {
            message: "@value must be a scalar unless @type is @json".to_string(),
        });
    }
    if result.language.is_some() && !value.is_string() {
        return Err(JsonLdError::InvalidValueObject {
            message: "language-tagged values must be strings".to_string(),
        });
    }

    // Inherit coercion from the term when the object itself is silent.
    if result.datatype.is_none() && result.language.is_none() {
        match def.and_then(|d| d.type_mapping.as_ref()) {
            Some(TypeMapping::Iri(dt)) => result.datatype = Some(dt.clone()),
            _ => {
                if value.is_string() {
                    result.language = active.language.clone();
                }
            }
        }
    }

    result.value = value.clone();
    Ok(vec![ExpandedNode::Value(result)])
}

fn expand_list_object(
    entries: &[(String, &String, &JsonValue)],
    active: &ActiveContext,
    def: Option<&TermDefinition>,
) -> Result<Vec<ExpandedNode>> {
    let mut items: Vec<ExpandedNode> = Vec::new();
    for (expanded_key, _, v) in entries {
        match expanded_key.as_str() {
            "@list" => {
                let expanded = expand_value(v, active, def)?;
                if expanded.iter().any(|e| matches!(e, ExpandedNode::List(_))) {
                    return Err(JsonLdError::ListOfLists);
                }
                items = expanded;
            }
            "@index" => {}
            other => {
                return Err(JsonLdError::InvalidValueObject {
                    message: format!("unexpected entry '{}' in a list object", other),
                })
            }
        }
    }
    Ok(vec![ExpandedNode::List(items)])
}

fn expand_set_object(
    entries: &[(String, &String, &JsonValue)],
    active: &ActiveContext,
    def: Option<&TermDefinition>,
) -> Result<Vec<ExpandedNode>> {
    let mut out = Vec::new();
    for (expanded_key, _, v) in entries {
        match expanded_key.as_str() {
            "@set" => out.extend(expand_value(v, active, def)?),
            "@index" => {}
            other => {
                return Err(JsonLdError::InvalidValueObject {
                    message: format!("unexpected entry '{}' in a set object", other),
                })
            }
        }
    }
    Ok(out)
}

fn expand_graph_object(
    entries: &[(String, &String, &JsonValue)],
    active: &ActiveContext,
) -> Result<Vec<ExpandedNode>> {
    let mut graph = GraphObject::default();
    let mut rest: Vec<(String, &String, &JsonValue)> = Vec::new();

    for (expanded_key, raw_key, v) in entries {
        match expanded_key.as_str() {
            "@graph" => {
                let nodes = expand_value(v, active, None)?;
                graph.nodes = nodes
                    .into_iter()
                    .filter(|n| !matches!(n, ExpandedNode::Value(_) | ExpandedNode::List(_)))
                    .collect();
            }
            "@id" => {
                if let Some(s) = v.as_str() {
                    graph.id = Some(if s.starts_with("_:") {
                        s.to_string()
                    } else {
                        expand_iri(s, active, false)
                    });
                }
            }
            "@index" => {}
            _ => rest.push((expanded_key.clone(), *raw_key, *v)),
        }
    }

    // Properties alongside @graph describe the graph-name node itself.
    if rest.is_empty() {
        return Ok(vec![ExpandedNode::Graph(graph)]);
    }
    let mut node = expand_node_object(&rest, active)?;
    node.id = graph.id.clone();
    Ok(vec![ExpandedNode::Node(node), ExpandedNode::Graph(graph)])
}

fn expand_node_object(
    entries: &[(String, &String, &JsonValue)],
    active: &ActiveContext,
) -> Result<NodeObject> {
    let mut node = NodeObject::default();

    for (expanded_key, raw_key, value) in entries {
        match expanded_key.as_str() {
            "@id" => {
                if let Some(s) = value.as_str() {
                    node.id = Some(if s.starts_with("_:") {
                        s.to_string()
                    } else {
                        expand_iri(s, active, false)
                    });
                }
            }
            "@type" => {
                let raw: Vec<&str> = match value {
                    JsonValue::String(s) => vec![s],
                    JsonValue::Array(arr) => {
                        let strings: Option<Vec<&str>> =
                            arr.iter().map(|v| v.as_str()).collect();
                        strings.ok_or_else(|| JsonLdError::InvalidTypeValue {
                            message: "@type array entries must be strings".to_string(),
                        })?
                    }
                    other => {
                        return Err(JsonLdError::InvalidTypeValue {
                            message: format!("@type must be a string or array, got {}", other),
                        })
                    }
                };
                node.types
                    .extend(raw.iter().map(|t| expand_iri(t, active, true)));
            }
            "@index" => {
                if let Some(s) = value.as_str() {
                    set_index(&mut node, s)?;
                }
            }
            "@reverse" => {
                let Some(obj) = value.as_object() else {
                    return Err(JsonLdError::InvalidContext {
                        message: "@reverse must be a map".to_string(),
                    });
                };
                for (prop, v) in obj {
                    let (rev_iri, rev_def) = details(prop, active, true);
                    let values = expand_value(v, active, rev_def.as_ref())?;
                    if !values.is_empty() {
                        node.reverse.entry(rev_iri).or_default().extend(values);
                    }
                }
            }
            key if key.starts_with('@') && keyword::is_keyword(key) => {
                // Remaining keywords (@nest, @none, ...) are out of scope;
                // dropping them loses no quad this processor can produce.
                continue;
            }
            _ => {
                let (_, term_def) = details(raw_key, active, true);

                // Keys that expand to neither an IRI nor a blank label
                // state nothing and are dropped.
                if !iri::looks_like_iri(expanded_key) {
                    continue;
                }

                if let Some(ref d) = term_def {
                    if let Some(ref rev_iri) = d.reverse {
                        let values = expand_value(value, active, term_def.as_ref())?;
                        if !values.is_empty() {
                            node.reverse
                                .entry(rev_iri.clone())
                                .or_default()
                                .extend(values);
                        }
                        continue;
                    }
                }

                // Null-dropped values must not leave an empty entry behind,
                // or the node would survive top-level pruning.
                let values = expand_property_value(value, active, term_def.as_ref())?;
                if !values.is_empty() {
                    node.properties
                        .entry(expanded_key.clone())
                        .or_default()
                        .extend(values);
                }
            }
        }
    }

    Ok(node)
}

fn set_index(node: &mut NodeObject, index: &str) -> Result<()> {
    match node.index {
        Some(ref existing) if existing != index => Err(JsonLdError::ConflictingIndexes {
            existing: existing.clone(),
            incoming: index.to_string(),
        }),
        _ => {
            node.index = Some(index.to_string());
            Ok(())
        }
    }
}

/// Expand one property value, honoring container maps
fn expand_property_value(
    value: &JsonValue,
    active: &ActiveContext,
    def: Option<&TermDefinition>,
) -> Result<Vec<ExpandedNode>> {
    let Some(d) = def else {
        return expand_value(value, active, None);
    };

    if let JsonValue::Object(map) = value {
        // Container maps reinterpret object keys; explicit keyword objects
        // (@value/@list/...) keep their ordinary meaning.
        let is_keyword_object = map
            .keys()
            .any(|k| matches!(details(k, active, true).0.as_str(), "@value" | "@list" | "@set" | "@graph"));

        if !is_keyword_object {
            if d.has_container(Container::Language) {
                return expand_language_map(map);
            }
            if d.has_container(Container::Index) {
                return expand_index_map(map, active, d);
            }
            if d.has_container(Container::Id) {
                return expand_id_map(map, active, d);
            }
            if d.has_container(Container::Type) {
                return expand_type_map(map, active, d);
            }
            if d.has_container(Container::Graph) {
                let nodes = expand_value(value, active, Some(d))?;
                return Ok(vec![ExpandedNode::Graph(GraphObject {
                    id: None,
                    nodes,
                })]);
            }
        }
    }

    let expanded = expand_value(value, active, Some(d))?;

    // A @list term wraps even a single non-array value.
    if d.has_container(Container::List)
        && !matches!(value, JsonValue::Array(_))
        && !expanded.iter().any(|e| matches!(e, ExpandedNode::List(_)))
    {
        return Ok(vec![ExpandedNode::List(expanded)]);
    }
    Ok(expanded)
}

fn expand_language_map(map: &Map<String, JsonValue>) -> Result<Vec<ExpandedNode>> {
    let mut out = Vec::new();
    for (lang, v) in map {
        let values: Vec<&JsonValue> = match v {
            JsonValue::Array(arr) => arr.iter().collect(),
            other => vec![other],
        };
        for item in values {
            let Some(s) = item.as_str() else {
                return Err(JsonLdError::InvalidValueObject {
                    message: format!("language map values must be strings, got {}", item),
                });
            };
            out.push(ExpandedNode::Value(if lang == "@none" {
                ValueObject::plain(JsonValue::String(s.to_string()))
            } else {
                ValueObject::tagged(JsonValue::String(s.to_string()), lang.clone())
            }));
        }
    }
    Ok(out)
}

fn expand_index_map(
    map: &Map<String, JsonValue>,
    active: &ActiveContext,
    def: &TermDefinition,
) -> Result<Vec<ExpandedNode>> {
    let mut out = Vec::new();
    for (index, v) in map {
        for mut item in expand_value(v, active, Some(def))? {
            if index != "@none" {
                match item {
                    ExpandedNode::Node(ref mut n) => set_index(n, index)?,
                    ExpandedNode::Value(ref mut val) => match val.index {
                        Some(ref existing) if existing != index => {
                            return Err(JsonLdError::ConflictingIndexes {
                                existing: existing.clone(),
                                incoming: index.clone(),
                            })
                        }
                        _ => val.index = Some(index.clone()),
                    },
                    _ => {}
                }
            }
            out.push(item);
        }
    }
    Ok(out)
}

fn expand_id_map(
    map: &Map<String, JsonValue>,
    active: &ActiveContext,
    def: &TermDefinition,
) -> Result<Vec<ExpandedNode>> {
    let mut out = Vec::new();
    for (id, v) in map {
        for mut item in expand_value(v, active, Some(def))? {
            if let ExpandedNode::Node(ref mut n) = item {
                if n.id.is_none() && id != "@none" {
                    n.id = Some(expand_iri(id, active, false));
                }
            }
            out.push(item);
        }
    }
    Ok(out)
}

fn expand_type_map(
    map: &Map<String, JsonValue>,
    active: &ActiveContext,
    def: &TermDefinition,
) -> Result<Vec<ExpandedNode>> {
    let mut out = Vec::new();
    for (type_key, v) in map {
        for mut item in expand_value(v, active, Some(def))? {
            if let ExpandedNode::Node(ref mut n) = item {
                if type_key != "@none" {
                    n.types.insert(0, expand_iri(type_key, active, true));
                }
            }
            out.push(item);
        }
    }
    Ok(out)
}

fn is_scalar(value: &JsonValue) -> bool {
    matches!(
        value,
        JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_)
    )
}
