//! JSON-LD processing pipeline
//!
//! Documents move through up to four stages: context processing resolves
//! `@context` expressions into an [`ActiveContext`]; expansion rewrites a
//! document into fully-qualified [`ExpandedNode`]s; quad extraction lowers
//! expanded nodes into an RDF [`QuadSet`]; canonicalization relabels blank
//! nodes deterministically and renders canonical N-Quads.
//!
//! The top-level operations compose these stages:
//!
//! - [`expand`] / [`expand_to_json`]: document -> expanded form
//! - [`compact`]: document -> expanded -> compact form under a new context
//! - [`to_rdf`]: document -> quads
//! - [`normalize`]: document -> canonical N-Quads text or its SHA-256 digest
//! - [`expand_with_loader`]: like [`expand`], but dereferences remote
//!   context IRIs through a [`DocumentLoader`]
//!
//! All synchronous operations refuse remote (string) contexts; only the
//! loader path performs IO.

pub mod compact;
pub mod context;
pub mod error;
pub mod expand;
pub mod extract;
pub mod iri;
pub mod loader;
pub mod node;
pub mod normalize;
pub mod options;

pub use compact::{compact_document, compact_iri, compact_iri_id};
pub use context::{ActiveContext, Container, ProcessingMode, TermDefinition, TypeMapping};
pub use error::{JsonLdError, Result};
pub use expand::{expand_document, expand_iri};
pub use extract::to_quads;
pub use loader::{ContextCache, DocumentLoader, RemoteDocument, StaticLoader};
pub use node::{ExpandedNode, GraphObject, NodeObject, ValueObject};
pub use normalize::canonical_json;
pub use options::{JsonLdOptions, OutputFormat};
pub use tessera_canon::{CanonError, CanonOptions, CanonVersion, Canonicalized};
pub use tessera_graph_ir::{Quad, QuadSet, Term};

use serde_json::Value as JsonValue;

/// Parse a context expression into an active context
///
/// Accepts inline maps, arrays, and null; remote (string) contexts need
/// [`loader::resolve_with_loader`].
pub fn parse_context(expr: &JsonValue) -> Result<ActiveContext> {
    ActiveContext::new().parse(expr)
}

fn initial_context(options: &JsonLdOptions) -> Result<ActiveContext> {
    let mut active = ActiveContext::with_base(options.base.as_deref());
    active.mode = options.processing_mode;
    match options.expand_context {
        Some(ref expr) => active.parse(expr),
        None => Ok(active),
    }
}

/// Expand a document to its structured expanded form
pub fn expand(document: &JsonValue, options: &JsonLdOptions) -> Result<Vec<ExpandedNode>> {
    let active = initial_context(options)?;
    expand::expand_document(document, &active)
}

/// Expand a document and render W3C expanded document form (an array)
pub fn expand_to_json(document: &JsonValue, options: &JsonLdOptions) -> Result<JsonValue> {
    Ok(node::to_json(&expand(document, options)?))
}

/// Compact a document under a new context
///
/// The document expands first, so its own `@context` only influences
/// interpretation of the input; `context` alone shapes the output and is
/// reattached at the root.
pub fn compact(
    document: &JsonValue,
    context: &JsonValue,
    options: &JsonLdOptions,
) -> Result<JsonValue> {
    let expanded = expand(document, options)?;
    compact::compact_document(&expanded, context)
}

/// Extract the RDF dataset a document states
pub fn to_rdf(document: &JsonValue, options: &JsonLdOptions) -> Result<QuadSet> {
    let expanded = expand(document, options)?;
    Ok(extract::to_quads(&expanded))
}

/// Normalize a document to canonical N-Quads (or their digest)
///
/// Expands, extracts quads, canonicalizes blank node labels under
/// `options.canon_version`, and renders per `options.output_format`.
/// Pathological blank node graphs exhausting `options.iteration_budget`
/// fail with [`CanonError::ToxicGraph`].
pub fn normalize(document: &JsonValue, options: &JsonLdOptions) -> Result<String> {
    let quads = to_rdf(document, options)?;
    tracing::debug!(quads = quads.len(), "canonicalizing dataset");
    let canonicalized = tessera_canon::canonicalize(
        &quads,
        &CanonOptions {
            version: options.canon_version,
            iteration_budget: options.iteration_budget,
        },
    )?;
    Ok(match options.output_format {
        OutputFormat::NQuads => canonicalized.to_nquads(),
        OutputFormat::Digest => canonicalized.digest(),
    })
}

/// Expand a document, dereferencing remote contexts
///
/// Resolves `options.expand_context` and the document's root `@context`
/// through `loader` (consulting `cache` first). Remote references nested
/// below the document root are not dereferenced and fail as they do on
/// the synchronous path.
pub async fn expand_with_loader(
    document: &JsonValue,
    options: &JsonLdOptions,
    loader: &dyn DocumentLoader,
    cache: &mut ContextCache,
) -> Result<Vec<ExpandedNode>> {
    let mut active = ActiveContext::with_base(options.base.as_deref());
    active.mode = options.processing_mode;
    if let Some(ref expr) = options.expand_context {
        active =
            loader::resolve_with_loader(&active, expr, loader, cache, options.loader_timeout)
                .await?;
    }

    match document {
        JsonValue::Object(map) if map.contains_key("@context") => {
            let mut rest = map.clone();
            if let Some(expr) = rest.remove("@context") {
                active =
                    loader::resolve_with_loader(&active, &expr, loader, cache, options.loader_timeout)
                        .await?;
            }
            expand::expand_document(&JsonValue::Object(rest), &active)
        }
        _ => expand::expand_document(document, &active),
    }
}
