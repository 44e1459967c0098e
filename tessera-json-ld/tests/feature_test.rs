//! Feature-level tests for expansion and compaction behavior

use pretty_assertions::assert_eq;
use serde_json::json;
use tessera_json_ld::{
    compact, expand, expand_to_json, parse_context, JsonLdError, JsonLdOptions,
};

#[test]
fn test_expand_empty_document() {
    let expanded = expand(&json!({}), &JsonLdOptions::default()).unwrap();
    assert!(expanded.is_empty());
}

#[test]
fn test_expand_simple_document() {
    let doc = json!({
        "@context": {"name": "http://schema.org/name"},
        "name": "John Doe"
    });
    assert_eq!(
        expand_to_json(&doc, &JsonLdOptions::default()).unwrap(),
        json!([{"http://schema.org/name": [{"@value": "John Doe"}]}])
    );
}

#[test]
fn test_null_values_drop_entirely() {
    let doc = json!({
        "@context": {"name": "http://ex/name"},
        "name": null
    });
    let expanded = expand(&doc, &JsonLdOptions::default()).unwrap();
    assert!(expanded.is_empty());
}

#[test]
fn test_compact_simple_document() {
    let doc = json!({
        "@context": {"name": "http://schema.org/name"},
        "name": "John Doe"
    });
    let context = json!({"name": "http://schema.org/name"});
    assert_eq!(
        compact(&doc, &context, &JsonLdOptions::default()).unwrap(),
        json!({
            "@context": {"name": "http://schema.org/name"},
            "name": "John Doe"
        })
    );
}

#[test]
fn test_compaction_round_trip_is_stable() {
    let context = json!({
        "xsd": "http://www.w3.org/2001/XMLSchema#",
        "name": "http://schema.org/name",
        "knows": {"@id": "http://xmlns.com/foaf/0.1/knows", "@type": "@id"},
        "nick": {"@id": "http://xmlns.com/foaf/0.1/nick", "@container": "@list"},
        "born": {"@id": "http://schema.org/birthDate", "@type": "xsd:date"}
    });
    let doc = json!({
        "@context": context.clone(),
        "@id": "http://example.org/alice",
        "name": "Alice",
        "born": "1990-04-01",
        "nick": ["al", "allie"],
        "knows": "http://example.org/bob"
    });
    let options = JsonLdOptions::default();

    let once = compact(&doc, &context, &options).unwrap();
    let twice = compact(&once, &context, &options).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_expand_context_option_applies_before_document() {
    let options = JsonLdOptions {
        expand_context: Some(json!({"name": "http://schema.org/name"})),
        ..JsonLdOptions::default()
    };
    assert_eq!(
        expand_to_json(&json!({"name": "Alice"}), &options).unwrap(),
        json!([{"http://schema.org/name": [{"@value": "Alice"}]}])
    );
}

#[test]
fn test_base_option_resolves_relative_ids() {
    let options = JsonLdOptions {
        base: Some("http://example.org/dir/".to_string()),
        ..JsonLdOptions::default()
    };
    let doc = json!({
        "@id": "thing",
        "http://schema.org/name": "Widget"
    });
    let expanded = expand(&doc, &options).unwrap();
    let node = expanded[0].as_node().unwrap();
    assert_eq!(node.id.as_deref(), Some("http://example.org/dir/thing"));
}

#[test]
fn test_protected_term_rejects_redefinition() {
    let active = parse_context(&json!({
        "@protected": true,
        "name": "http://schema.org/name"
    }))
    .unwrap();

    let err = active
        .parse(&json!({"name": "http://example.org/name"}))
        .unwrap_err();
    assert!(matches!(
        err,
        JsonLdError::ProtectedTermRedefinition { ref term } if term == "name"
    ));
    assert_eq!(err.code(), "protected term redefinition");
}

#[test]
fn test_list_of_lists_rejected() {
    let doc = json!({
        "@context": {"xs": {"@id": "http://example.org/xs", "@container": "@list"}},
        "xs": [["a", "b"]]
    });
    let err = expand(&doc, &JsonLdOptions::default()).unwrap_err();
    assert!(matches!(err, JsonLdError::ListOfLists));
}

#[test]
fn test_conflicting_indexes_rejected() {
    let doc = json!({
        "@context": {"p": {"@id": "http://example.org/p", "@container": "@index"}},
        "p": {"i1": {"@id": "http://example.org/x", "@index": "i2"}}
    });
    let err = expand(&doc, &JsonLdOptions::default()).unwrap_err();
    assert!(matches!(err, JsonLdError::ConflictingIndexes { .. }));
}

#[test]
fn test_language_map_expands_to_tagged_values() {
    let doc = json!({
        "@context": {
            "label": {"@id": "http://example.org/label", "@container": "@language"}
        },
        "@id": "http://example.org/1",
        "label": {"en": "Queen", "de": "Königin"}
    });
    let expanded = expand(&doc, &JsonLdOptions::default()).unwrap();
    let node = expanded[0].as_node().unwrap();
    let values = &node.properties["http://example.org/label"];
    let mut langs: Vec<&str> = values
        .iter()
        .filter_map(|v| v.as_value())
        .filter_map(|v| v.language.as_deref())
        .collect();
    langs.sort_unstable();
    assert_eq!(langs, vec!["de", "en"]);
}

#[test]
fn test_type_scoped_context_applies_to_typed_node() {
    let doc = json!({
        "@context": {
            "Person": {
                "@id": "http://schema.org/Person",
                "@context": {"name": "http://schema.org/name"}
            }
        },
        "@type": "Person",
        "name": "Alice"
    });
    let expanded = expand(&doc, &JsonLdOptions::default()).unwrap();
    let node = expanded[0].as_node().unwrap();
    assert_eq!(node.types, vec!["http://schema.org/Person"]);
    assert!(node.properties.contains_key("http://schema.org/name"));
}

#[test]
fn test_compact_selects_most_specific_term() {
    let context = json!({
        "ex": "http://example.org/",
        "tags": {"@id": "http://example.org/tag", "@container": "@set"}
    });
    let doc = json!({
        "@id": "http://example.org/1",
        "http://example.org/tag": ["a", "b"]
    });
    let compacted = compact(&doc, &context, &JsonLdOptions::default()).unwrap();
    assert_eq!(compacted["tags"], json!(["a", "b"]));
}
