//! Active context processing
//!
//! An [`ActiveContext`] is an immutable snapshot: every context expression
//! derives a new snapshot from its parent, never mutates one in place.
//! Inline (map/array/null) forms are handled here synchronously; string
//! forms are remote context IRIs and only resolve through the async loader
//! path in [`crate::loader`].

use crate::error::{JsonLdError, Result};
use crate::iri;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use tessera_vocab::keyword;

/// Which JSON-LD grammar revision governs processing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProcessingMode {
    JsonLd1_0,
    #[default]
    JsonLd1_1,
}

/// Container kinds for @container values
///
/// `Id`, `Type`, and `Graph` are 1.1-only; defining them under 1.0 mode
/// fails with [`JsonLdError::UnsupportedProcessingMode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    List,
    Set,
    Language,
    Index,
    Id,
    Type,
    Graph,
}

/// Type coercion declared on a term
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeMapping {
    /// @id - string values expand to IRI references
    Id,
    /// @vocab - like Id but vocab-relative
    Vocab,
    /// @json - values become rdf:JSON literals verbatim
    Json,
    /// A datatype IRI
    Iri(String),
}

/// One term definition inside an active context
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TermDefinition {
    /// Expanded IRI mapping; keywords appear here for aliases
    /// (e.g. a term "id" mapping to "@id")
    pub iri: Option<String>,
    /// Reverse property IRI (@reverse)
    pub reverse: Option<String>,
    /// Type coercion (@type)
    pub type_mapping: Option<TypeMapping>,
    /// Container kinds (@container), order-insensitive
    pub containers: Vec<Container>,
    /// Term language override; Some(None) explicitly clears the default
    pub language: Option<Option<String>>,
    /// Scoped context (@context), kept raw and applied when the term is used
    pub context: Option<JsonValue>,
    /// Protected terms reject non-identical redefinition
    pub protected: bool,
}

impl TermDefinition {
    pub fn has_container(&self, c: Container) -> bool {
        self.containers.contains(&c)
    }

    /// Compare everything except the protected flag. Re-stating a
    /// protected term identically is allowed.
    fn same_definition(&self, other: &TermDefinition) -> bool {
        self.iri == other.iri
            && self.reverse == other.reverse
            && self.type_mapping == other.type_mapping
            && self.containers == other.containers
            && self.language == other.language
            && self.context == other.context
    }
}

/// A fully resolved context snapshot
#[derive(Clone, Debug, Default)]
pub struct ActiveContext {
    /// Term definitions, keyed by the literal term string
    pub terms: HashMap<String, TermDefinition>,
    /// Default vocabulary mapping (@vocab), trailing-slash normalized
    pub vocab: Option<String>,
    /// Base IRI for resolving relative references (@base)
    pub base: Option<String>,
    /// Default language (@language)
    pub language: Option<String>,
    /// Default base direction (@direction), "ltr" or "rtl"
    pub direction: Option<String>,
    /// Grammar revision (@version)
    pub mode: ProcessingMode,
}

impl ActiveContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh context with an API-supplied base IRI
    pub fn with_base(base: Option<&str>) -> Self {
        Self {
            base: base.map(|s| s.to_string()),
            ..Self::default()
        }
    }

    /// Look up a term definition
    pub fn term(&self, key: &str) -> Option<&TermDefinition> {
        self.terms.get(key)
    }

    /// Derive a new snapshot from a context expression
    ///
    /// Accepts null (reset), inline maps, and arrays of those. A bare
    /// string is a remote context IRI, which this synchronous path cannot
    /// dereference.
    pub fn parse(&self, expr: &JsonValue) -> Result<ActiveContext> {
        match expr {
            JsonValue::Null => {
                // Null cannot drop protected terms.
                if let Some(term) = self.terms.iter().find(|(_, d)| d.protected) {
                    return Err(JsonLdError::ProtectedTermRedefinition {
                        term: term.0.clone(),
                    });
                }
                Ok(ActiveContext {
                    base: self.base.clone(),
                    mode: self.mode,
                    ..ActiveContext::default()
                })
            }

            JsonValue::String(s) => Err(JsonLdError::LoadingRemoteContextFailed {
                iri: s.clone(),
                message: "remote contexts require a document loader".to_string(),
            }),

            JsonValue::Object(map) => {
                // Tolerate a wrapping {"@context": ...} document.
                if let Some(inner) = map.get("@context") {
                    if map.len() == 1 {
                        return self.parse(inner);
                    }
                }
                self.parse_map(map)
            }

            JsonValue::Array(arr) => {
                let mut active = self.clone();
                for item in arr {
                    active = active.parse(item)?;
                }
                Ok(active)
            }

            other => Err(JsonLdError::InvalidContext {
                message: format!("context must be null, string, map, or array, got {}", other),
            }),
        }
    }

    fn parse_map(&self, map: &Map<String, JsonValue>) -> Result<ActiveContext> {
        let mut result = self.clone();

        // Keywords first; term definitions may depend on @vocab/@base.
        for (key, value) in map {
            match key.as_str() {
                "@version" => match value.as_f64() {
                    Some(v) if v == 1.0 => result.mode = ProcessingMode::JsonLd1_0,
                    Some(v) if v == 1.1 => result.mode = ProcessingMode::JsonLd1_1,
                    _ => {
                        return Err(JsonLdError::InvalidContext {
                            message: format!("@version must be 1.0 or 1.1, got {}", value),
                        })
                    }
                },
                "@base" => match value {
                    JsonValue::String(s) => {
                        result.base = Some(match &self.base {
                            Some(base) if !iri::is_absolute(s) => iri::join(base, s),
                            _ => s.clone(),
                        });
                    }
                    JsonValue::Null => result.base = None,
                    other => {
                        return Err(JsonLdError::InvalidContext {
                            message: format!("@base must be a string or null, got {}", other),
                        })
                    }
                },
                "@vocab" => result.vocab = compute_vocab(&result, map, value)?,
                "@language" => match value {
                    JsonValue::String(s) => result.language = Some(s.clone()),
                    JsonValue::Null => result.language = None,
                    other => {
                        return Err(JsonLdError::InvalidContext {
                            message: format!("@language must be a string or null, got {}", other),
                        })
                    }
                },
                "@direction" => match value {
                    JsonValue::String(s) if s == "ltr" || s == "rtl" => {
                        result.direction = Some(s.clone())
                    }
                    JsonValue::Null => result.direction = None,
                    other => {
                        return Err(JsonLdError::InvalidContext {
                            message: format!("@direction must be \"ltr\", \"rtl\", or null, got {}", other),
                        })
                    }
                },
                _ => {}
            }
        }

        let protect_all = map.get("@protected").and_then(|v| v.as_bool()).unwrap_or(false);

        for (key, value) in map {
            if key.starts_with('@') {
                if !keyword::is_keyword(key) {
                    return Err(JsonLdError::InvalidContext {
                        message: format!("unknown keyword-like term '{}'", key),
                    });
                }
                continue;
            }
            if key.is_empty() {
                return Err(JsonLdError::InvalidIriMapping {
                    term: key.clone(),
                });
            }

            let mut def = parse_term_definition(key, value, map, &result)?;
            if protect_all {
                def.protected = true;
            }

            if let Some(existing) = self.terms.get(key) {
                if existing.protected && !existing.same_definition(&def) {
                    return Err(JsonLdError::ProtectedTermRedefinition { term: key.clone() });
                }
                // A protected term stays protected through an identical
                // restatement.
                if existing.protected {
                    def.protected = true;
                }
            }

            result.terms.insert(key.clone(), def);
        }

        Ok(result)
    }
}

/// Compute the @vocab mapping
///
/// Empty string means "use @base"; relative values join with @base.
fn compute_vocab(
    active: &ActiveContext,
    map: &Map<String, JsonValue>,
    value: &JsonValue,
) -> Result<Option<String>> {
    match value {
        JsonValue::String(s) => {
            if s.is_empty() {
                let base = map
                    .get("@base")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .or_else(|| active.base.clone());
                Ok(base.map(|b| iri::add_trailing_slash(&b)))
            } else if !iri::is_absolute(s) {
                match map
                    .get("@base")
                    .and_then(|v| v.as_str())
                    .or(active.base.as_deref())
                {
                    Some(base) => Ok(Some(iri::join(base, s))),
                    None => Ok(Some(iri::add_trailing_slash(s))),
                }
            } else {
                Ok(Some(iri::add_trailing_slash(s)))
            }
        }
        JsonValue::Null => Ok(None),
        other => Err(JsonLdError::InvalidContext {
            message: format!("@vocab must be a string or null, got {}", other),
        }),
    }
}

/// Resolve a term's string value through sibling definitions in the same
/// context map, failing on reference cycles.
fn resolve_term_chain<'a>(
    term: &'a str,
    map: &'a Map<String, JsonValue>,
    visited: &mut Vec<&'a str>,
) -> Result<&'a str> {
    if visited.contains(&term) {
        return Err(JsonLdError::CyclicIriMapping {
            term: term.to_string(),
        });
    }

    let Some(value) = map.get(term) else {
        return Ok(term);
    };
    match value {
        JsonValue::String(s) => {
            if s == term {
                return Err(JsonLdError::CyclicIriMapping {
                    term: term.to_string(),
                });
            }
            if !s.contains(':') && !s.starts_with('@') && map.contains_key(s.as_str()) {
                visited.push(term);
                return resolve_term_chain(s, map, visited);
            }
            Ok(s)
        }
        JsonValue::Object(obj) => match obj.get("@id") {
            Some(JsonValue::String(id)) => Ok(id),
            _ => Ok(term),
        },
        _ => Ok(term),
    }
}

/// Expand a potentially compact IRI during context parsing, consulting
/// sibling raw definitions first, then already-active terms, then @vocab.
fn resolve_iri_in_context(
    value: &str,
    map: &Map<String, JsonValue>,
    active: &ActiveContext,
) -> String {
    if let Some((prefix, suffix)) = iri::parse_prefix(value) {
        if let Some(prefix_val) = map.get(prefix) {
            let prefix_iri = match prefix_val {
                JsonValue::String(s) => Some(s.as_str()),
                JsonValue::Object(obj) => obj.get("@id").and_then(|v| v.as_str()),
                _ => None,
            };
            if let Some(prefix_iri) = prefix_iri {
                return format!("{}{}", prefix_iri, suffix);
            }
        }
        if let Some(def) = active.terms.get(prefix) {
            if let Some(ref prefix_iri) = def.iri {
                return format!("{}{}", prefix_iri, suffix);
            }
        }
        return value.to_string();
    }

    if !value.starts_with('@') && !iri::looks_like_iri(value) {
        if let Some(ref vocab) = active.vocab {
            return format!("{}{}", vocab, value);
        }
    }

    value.to_string()
}

fn parse_type_mapping(
    value: &JsonValue,
    map: &Map<String, JsonValue>,
    active: &ActiveContext,
) -> Result<Option<TypeMapping>> {
    match value {
        JsonValue::String(s) => {
            let resolved = resolve_iri_in_context(s, map, active);
            Ok(Some(match resolved.as_str() {
                "@id" => TypeMapping::Id,
                "@vocab" => TypeMapping::Vocab,
                "@json" => TypeMapping::Json,
                _ => TypeMapping::Iri(resolved),
            }))
        }
        JsonValue::Null => Ok(None),
        other => Err(JsonLdError::InvalidTypeValue {
            message: format!("@type in a term definition must be a string, got {}", other),
        }),
    }
}

fn parse_container_value(value: &JsonValue, mode: ProcessingMode) -> Result<Vec<Container>> {
    let entries: Vec<&JsonValue> = match value {
        JsonValue::Array(arr) => arr.iter().collect(),
        other => vec![other],
    };

    let mut containers = Vec::new();
    for entry in entries {
        let Some(s) = entry.as_str() else {
            return Err(JsonLdError::InvalidContext {
                message: format!("@container entries must be strings, got {}", entry),
            });
        };
        let container = match s {
            "@list" => Container::List,
            "@set" => Container::Set,
            "@language" => Container::Language,
            "@index" => Container::Index,
            "@id" => Container::Id,
            "@type" => Container::Type,
            "@graph" => Container::Graph,
            other => {
                return Err(JsonLdError::InvalidContext {
                    message: format!("unknown @container value '{}'", other),
                })
            }
        };
        if mode == ProcessingMode::JsonLd1_0
            && matches!(container, Container::Id | Container::Type | Container::Graph)
        {
            return Err(JsonLdError::UnsupportedProcessingMode {
                feature: format!("@container: {}", s),
            });
        }
        containers.push(container);
    }

    if containers.contains(&Container::List) && containers.contains(&Container::Set) {
        return Err(JsonLdError::InvalidContext {
            message: "@container cannot combine @list and @set".to_string(),
        });
    }
    Ok(containers)
}

fn parse_term_definition(
    key: &str,
    value: &JsonValue,
    map: &Map<String, JsonValue>,
    active: &ActiveContext,
) -> Result<TermDefinition> {
    match value {
        JsonValue::Null => Ok(TermDefinition::default()),

        JsonValue::String(_) => {
            let mut visited = Vec::new();
            let resolved = resolve_term_chain(key, map, &mut visited)?;
            let expanded = if resolved.starts_with('@') {
                if !keyword::is_keyword(resolved) {
                    return Err(JsonLdError::InvalidIriMapping {
                        term: key.to_string(),
                    });
                }
                resolved.to_string()
            } else {
                resolve_iri_in_context(resolved, map, active)
            };
            Ok(TermDefinition {
                iri: Some(expanded),
                ..TermDefinition::default()
            })
        }

        JsonValue::Object(obj) => {
            let mut def = TermDefinition::default();

            for (k, v) in obj {
                match k.as_str() {
                    "@id" => match v {
                        JsonValue::String(s) => {
                            def.iri = Some(if keyword::is_keyword(s) {
                                s.clone()
                            } else {
                                resolve_iri_in_context(s, map, active)
                            });
                        }
                        JsonValue::Null => {}
                        other => {
                            return Err(JsonLdError::InvalidIriMapping {
                                term: format!("{} (@id was {})", key, other),
                            })
                        }
                    },
                    "@reverse" => {
                        if let Some(s) = v.as_str() {
                            def.reverse = Some(resolve_iri_in_context(s, map, active));
                        } else {
                            return Err(JsonLdError::InvalidIriMapping {
                                term: key.to_string(),
                            });
                        }
                    }
                    "@type" => def.type_mapping = parse_type_mapping(v, map, active)?,
                    "@container" => def.containers = parse_container_value(v, active.mode)?,
                    "@language" => {
                        def.language = Some(if v.is_null() {
                            None
                        } else {
                            v.as_str().map(|s| s.to_string())
                        });
                    }
                    "@context" => {
                        if active.mode == ProcessingMode::JsonLd1_0 {
                            return Err(JsonLdError::UnsupportedProcessingMode {
                                feature: "scoped @context".to_string(),
                            });
                        }
                        def.context = Some(v.clone());
                    }
                    "@protected" => def.protected = v.as_bool().unwrap_or(false),
                    "@prefix" => {}
                    other => {
                        return Err(JsonLdError::InvalidContext {
                            message: format!("unknown entry '{}' in definition of '{}'", other, key),
                        })
                    }
                }
            }

            if def.iri.is_none() && def.reverse.is_none() {
                def.iri = Some(resolve_iri_in_context(key, map, active));
            }

            Ok(def)
        }

        other => Err(JsonLdError::InvalidContext {
            message: format!("invalid definition for term '{}': {}", key, other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefix_terms() {
        let ctx = ActiveContext::new()
            .parse(&json!({
                "owl": "http://www.w3.org/2002/07/owl#",
                "ex": "http://example.org/ns#"
            }))
            .unwrap();

        assert_eq!(
            ctx.term("owl").unwrap().iri.as_deref(),
            Some("http://www.w3.org/2002/07/owl#")
        );
        assert_eq!(
            ctx.term("ex").unwrap().iri.as_deref(),
            Some("http://example.org/ns#")
        );
    }

    #[test]
    fn test_forward_reference_chain() {
        let ctx = ActiveContext::new()
            .parse(&json!({
                "clri": "https://purl.imsglobal.org/spec/clr/vocab#",
                "Address": "dtAddress",
                "dtAddress": "clri:dtAddress"
            }))
            .unwrap();

        assert_eq!(
            ctx.term("Address").unwrap().iri.as_deref(),
            Some("https://purl.imsglobal.org/spec/clr/vocab#dtAddress")
        );
    }

    #[test]
    fn test_cycle_detected() {
        let err = ActiveContext::new()
            .parse(&json!({"foo": "foo"}))
            .unwrap_err();
        assert!(matches!(err, JsonLdError::CyclicIriMapping { .. }));

        let err = ActiveContext::new()
            .parse(&json!({"a": "b", "b": "a"}))
            .unwrap_err();
        assert!(matches!(err, JsonLdError::CyclicIriMapping { .. }));
    }

    #[test]
    fn test_array_of_contexts() {
        let ctx = ActiveContext::new()
            .parse(&json!([
                {"schema": "http://schema.org/"},
                {"name": "schema:name"}
            ]))
            .unwrap();

        assert_eq!(
            ctx.term("name").unwrap().iri.as_deref(),
            Some("http://schema.org/name")
        );
    }

    #[test]
    fn test_null_resets() {
        let base = ActiveContext::new()
            .parse(&json!({"schema": "http://schema.org/"}))
            .unwrap();
        let cleared = base.parse(&JsonValue::Null).unwrap();
        assert!(cleared.terms.is_empty());
    }

    #[test]
    fn test_null_cannot_drop_protected_terms() {
        let base = ActiveContext::new()
            .parse(&json!({
                "@protected": true,
                "name": "http://schema.org/name"
            }))
            .unwrap();
        let err = base.parse(&JsonValue::Null).unwrap_err();
        assert!(matches!(err, JsonLdError::ProtectedTermRedefinition { .. }));
    }

    #[test]
    fn test_protected_term_redefinition() {
        let base = ActiveContext::new()
            .parse(&json!({
                "name": {"@id": "http://schema.org/name", "@protected": true}
            }))
            .unwrap();

        // A different mapping is rejected.
        let err = base
            .parse(&json!({"name": "http://example.org/name"}))
            .unwrap_err();
        assert!(matches!(
            err,
            JsonLdError::ProtectedTermRedefinition { ref term } if term == "name"
        ));

        // An identical restatement is fine and stays protected.
        let same = base
            .parse(&json!({"name": {"@id": "http://schema.org/name"}}))
            .unwrap();
        assert!(same.term("name").unwrap().protected);
    }

    #[test]
    fn test_type_coercion_and_containers() {
        let ctx = ActiveContext::new()
            .parse(&json!({
                "xsd": "http://www.w3.org/2001/XMLSchema#",
                "created": {"@id": "http://purl.org/dc/terms/created", "@type": "xsd:dateTime"},
                "knows": {"@id": "http://xmlns.com/foaf/0.1/knows", "@type": "@id"},
                "nick": {"@id": "http://xmlns.com/foaf/0.1/nick", "@container": "@list"}
            }))
            .unwrap();

        assert_eq!(
            ctx.term("created").unwrap().type_mapping,
            Some(TypeMapping::Iri(
                "http://www.w3.org/2001/XMLSchema#dateTime".to_string()
            ))
        );
        assert_eq!(ctx.term("knows").unwrap().type_mapping, Some(TypeMapping::Id));
        assert!(ctx.term("nick").unwrap().has_container(Container::List));
    }

    #[test]
    fn test_1_0_mode_rejects_1_1_containers() {
        let err = ActiveContext::new()
            .parse(&json!({
                "@version": 1.0,
                "entries": {"@id": "http://example.org/entries", "@container": "@id"}
            }))
            .unwrap_err();
        assert!(matches!(err, JsonLdError::UnsupportedProcessingMode { .. }));
    }

    #[test]
    fn test_vocab_empty_string_uses_base() {
        let ctx = ActiveContext::new()
            .parse(&json!({
                "@base": "https://example.com/ledger/",
                "@vocab": ""
            }))
            .unwrap();
        assert_eq!(ctx.vocab.as_deref(), Some("https://example.com/ledger/"));
    }

    #[test]
    fn test_direction_validated() {
        let ctx = ActiveContext::new()
            .parse(&json!({"@language": "ar", "@direction": "rtl"}))
            .unwrap();
        assert_eq!(ctx.direction.as_deref(), Some("rtl"));

        let err = ActiveContext::new()
            .parse(&json!({"@direction": "sideways"}))
            .unwrap_err();
        assert!(matches!(err, JsonLdError::InvalidContext { .. }));
    }

    #[test]
    fn test_string_context_needs_loader() {
        let err = ActiveContext::new()
            .parse(&json!("https://example.org/context.jsonld"))
            .unwrap_err();
        assert!(matches!(err, JsonLdError::LoadingRemoteContextFailed { .. }));
    }

    #[test]
    fn test_keyword_alias() {
        let ctx = ActiveContext::new()
            .parse(&json!({"id": "@id", "type": "@type"}))
            .unwrap();
        assert_eq!(ctx.term("id").unwrap().iri.as_deref(), Some("@id"));
        assert_eq!(ctx.term("type").unwrap().iri.as_deref(), Some("@type"));
    }

    #[test]
    fn test_list_set_conflict() {
        let err = ActiveContext::new()
            .parse(&json!({
                "xs": {"@id": "http://example.org/xs", "@container": ["@list", "@set"]}
            }))
            .unwrap_err();
        assert!(matches!(err, JsonLdError::InvalidContext { .. }));
    }
}
