//! Remote context resolution
//!
//! String contexts are IRIs of remote documents. The synchronous parse
//! path refuses them; this module resolves them through a caller-supplied
//! [`DocumentLoader`] with a caller-owned [`ContextCache`], tracking the
//! dereference chain to reject cyclic inclusion.

use crate::context::ActiveContext;
use crate::error::{JsonLdError, Result};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A dereferenced remote document
#[derive(Clone, Debug)]
pub struct RemoteDocument {
    pub document: JsonValue,
    pub document_url: String,
    /// Alternate context location from an HTTP Link header, if any
    pub context_url: Option<String>,
}

/// Fetches remote documents by IRI
///
/// Implementations decide transport and policy (HTTP, filesystem,
/// allowlists). The resolver never fetches the same IRI twice within one
/// cache lifetime.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, iri: &str) -> Result<RemoteDocument>;
}

/// Loader backed by a fixed in-memory map, primarily for tests and
/// offline operation with pinned context documents.
#[derive(Clone, Debug, Default)]
pub struct StaticLoader {
    documents: HashMap<String, JsonValue>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, iri: impl Into<String>, document: JsonValue) -> Self {
        self.documents.insert(iri.into(), document);
        self
    }
}

#[async_trait]
impl DocumentLoader for StaticLoader {
    async fn load(&self, iri: &str) -> Result<RemoteDocument> {
        match self.documents.get(iri) {
            Some(document) => Ok(RemoteDocument {
                document: document.clone(),
                document_url: iri.to_string(),
                context_url: None,
            }),
            None => Err(JsonLdError::LoadingDocumentFailed {
                message: format!("no document registered for {}", iri),
            }),
        }
    }
}

/// Caller-owned cache of dereferenced context expressions, keyed by IRI
///
/// Ownership stays with the caller so cache lifetime and eviction policy
/// are theirs to decide; the resolver only reads and fills it.
#[derive(Clone, Debug, Default)]
pub struct ContextCache {
    entries: HashMap<String, JsonValue>,
}

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, iri: &str) -> Option<&JsonValue> {
        self.entries.get(iri)
    }

    pub fn insert(&mut self, iri: impl Into<String>, context: JsonValue) {
        self.entries.insert(iri.into(), context);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve a context expression, dereferencing remote IRIs
///
/// Inline forms parse as usual; strings fetch through the loader (cache
/// first), then the fetched `@context` resolves recursively. An IRI
/// re-encountered on the active dereference chain is
/// [`JsonLdError::RecursiveContextInclusion`]; a fetch exceeding `timeout`
/// is [`JsonLdError::LoadingRemoteContextFailed`].
pub async fn resolve_with_loader(
    active: &ActiveContext,
    expr: &JsonValue,
    loader: &dyn DocumentLoader,
    cache: &mut ContextCache,
    timeout: Duration,
) -> Result<ActiveContext> {
    let mut visited = Vec::new();
    resolve(active.clone(), expr, loader, cache, &mut visited, timeout).await
}

fn resolve<'a>(
    active: ActiveContext,
    expr: &'a JsonValue,
    loader: &'a dyn DocumentLoader,
    cache: &'a mut ContextCache,
    visited: &'a mut Vec<String>,
    timeout: Duration,
) -> Pin<Box<dyn Future<Output = Result<ActiveContext>> + Send + 'a>> {
    Box::pin(async move {
        match expr {
            JsonValue::String(iri) => {
                if visited.iter().any(|v| v == iri) {
                    return Err(JsonLdError::RecursiveContextInclusion {
                        iri: iri.clone(),
                        chain: visited.clone(),
                    });
                }

                let context = match cache.get(iri) {
                    Some(cached) => {
                        tracing::debug!(%iri, "context cache hit");
                        cached.clone()
                    }
                    None => {
                        tracing::debug!(%iri, "dereferencing remote context");
                        let remote = tokio::time::timeout(timeout, loader.load(iri))
                            .await
                            .map_err(|_| JsonLdError::LoadingRemoteContextFailed {
                                iri: iri.clone(),
                                message: format!("timed out after {:?}", timeout),
                            })??;
                        let Some(context) = remote.document.get("@context") else {
                            return Err(JsonLdError::LoadingRemoteContextFailed {
                                iri: iri.clone(),
                                message: "document carries no @context".to_string(),
                            });
                        };
                        cache.insert(iri.clone(), context.clone());
                        context.clone()
                    }
                };

                visited.push(iri.clone());
                let resolved = resolve(active, &context, loader, cache, visited, timeout).await;
                visited.pop();
                resolved
            }

            JsonValue::Array(items) => {
                let mut active = active;
                for item in items {
                    active = resolve(active, item, loader, cache, visited, timeout).await?;
                }
                Ok(active)
            }

            inline => active.parse(inline),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture_loader() -> StaticLoader {
        StaticLoader::new()
            .with_document(
                "https://example.org/base.jsonld",
                json!({"@context": {"schema": "http://schema.org/"}}),
            )
            .with_document(
                "https://example.org/person.jsonld",
                json!({"@context": [
                    "https://example.org/base.jsonld",
                    {"name": "schema:name"}
                ]}),
            )
    }

    #[tokio::test]
    async fn test_resolves_chained_remote_contexts() {
        let loader = fixture_loader();
        let mut cache = ContextCache::new();
        let active = resolve_with_loader(
            &ActiveContext::new(),
            &json!("https://example.org/person.jsonld"),
            &loader,
            &mut cache,
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        assert_eq!(
            active.term("name").unwrap().iri.as_deref(),
            Some("http://schema.org/name")
        );
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_cache_short_circuits_loader() {
        let loader = StaticLoader::new();
        let mut cache = ContextCache::new();
        cache.insert(
            "https://example.org/cached.jsonld",
            json!({"ex": "http://example.org/"}),
        );

        // The loader has no documents, so only the cache can satisfy this.
        let active = resolve_with_loader(
            &ActiveContext::new(),
            &json!("https://example.org/cached.jsonld"),
            &loader,
            &mut cache,
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        assert_eq!(
            active.term("ex").unwrap().iri.as_deref(),
            Some("http://example.org/")
        );
    }

    #[tokio::test]
    async fn test_recursive_inclusion_rejected() {
        let loader = StaticLoader::new()
            .with_document(
                "https://example.org/a.jsonld",
                json!({"@context": "https://example.org/b.jsonld"}),
            )
            .with_document(
                "https://example.org/b.jsonld",
                json!({"@context": "https://example.org/a.jsonld"}),
            );
        let mut cache = ContextCache::new();
        let err = resolve_with_loader(
            &ActiveContext::new(),
            &json!("https://example.org/a.jsonld"),
            &loader,
            &mut cache,
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            JsonLdError::RecursiveContextInclusion { ref iri, ref chain }
                if iri == "https://example.org/a.jsonld" && chain.len() == 2
        ));
    }

    #[tokio::test]
    async fn test_unknown_document_fails() {
        let loader = StaticLoader::new();
        let mut cache = ContextCache::new();
        let err = resolve_with_loader(
            &ActiveContext::new(),
            &json!("https://example.org/missing.jsonld"),
            &loader,
            &mut cache,
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, JsonLdError::LoadingDocumentFailed { .. }));
    }

    #[tokio::test]
    async fn test_slow_loader_times_out() {
        struct SlowLoader;

        #[async_trait]
        impl DocumentLoader for SlowLoader {
            async fn load(&self, iri: &str) -> Result<RemoteDocument> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(RemoteDocument {
                    document: json!({"@context": {}}),
                    document_url: iri.to_string(),
                    context_url: None,
                })
            }
        }

        let mut cache = ContextCache::new();
        let err = resolve_with_loader(
            &ActiveContext::new(),
            &json!("https://example.org/slow.jsonld"),
            &SlowLoader,
            &mut cache,
            Duration::from_millis(10),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            JsonLdError::LoadingRemoteContextFailed { ref message, .. }
                if message.contains("timed out")
        ));
    }
}
