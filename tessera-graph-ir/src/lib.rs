//! RDF quad intermediate representation
//!
//! This crate provides the canonical types for representing RDF datasets
//! produced by the JSON-LD pipeline and consumed by the canonicalizer and
//! serializer, independent of any surface syntax.
//!
//! # Key Design Principles
//!
//! 1. **Expanded IRIs only** - All IRIs are stored in expanded form.
//!    Compaction belongs to formatters.
//!
//! 2. **Lexical literals** - Literals carry a lexical form plus an explicit
//!    datatype IRI, never a host-language value. Plain strings use
//!    `xsd:string`, language-tagged strings `rdf:langString`.
//!
//! 3. **Bag semantics by default** - `QuadSet` uses `Vec<Quad>` and
//!    preserves duplicates. Call `dedupe()` explicitly for set semantics.
//!
//! 4. **Deterministic output** - `nquads::serialize` sorts lines byte-wise,
//!    so equal quad multisets always render identically.
//!
//! # Example
//!
//! ```
//! use tessera_graph_ir::{QuadSet, Quad, Term};
//!
//! let mut quads = QuadSet::new();
//! quads.add(Quad::triple(
//!     Term::iri("http://example.org/alice"),
//!     Term::iri("http://xmlns.com/foaf/0.1/name"),
//!     Term::string("Alice"),
//! ));
//!
//! let text = tessera_graph_ir::nquads::serialize(&quads);
//! assert!(text.ends_with(" .\n"));
//! ```

mod dataset;
pub mod nquads;
mod quad;
mod term;

pub use dataset::QuadSet;
pub use quad::Quad;
pub use term::{BlankLabel, Term};
