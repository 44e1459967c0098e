//! Quad set - a collection of RDF quads
//!
//! `QuadSet` uses `Vec<Quad>` to preserve duplicates (bag semantics).
//! Call `dedupe()` explicitly if you want set semantics.

use crate::{Quad, Term};
use std::collections::BTreeSet;

/// An unordered multiset of RDF quads
///
/// # Design Decisions
///
/// - **Vec storage**: preserves duplicates and insertion order from
///   extraction.
/// - **Explicit deduplication**: call `dedupe()` for set semantics.
/// - **Deterministic output**: call `sort()` (or serialize through
///   `nquads`) for stable ordering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuadSet {
    quads: Vec<Quad>,
}

impl QuadSet {
    /// Create an empty quad set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a quad
    pub fn add(&mut self, quad: Quad) {
        self.quads.push(quad);
    }

    /// Add a quad by components, in the default graph
    pub fn add_triple(&mut self, s: Term, p: Term, o: Term) {
        self.add(Quad::triple(s, p, o));
    }

    /// Number of quads (counting duplicates)
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Iterate over quads
    pub fn iter(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter()
    }

    /// Sort quads by (subject, predicate, object, graph) term order
    pub fn sort(&mut self) {
        self.quads.sort();
    }

    /// Remove duplicate quads (requires a sort)
    pub fn dedupe(&mut self) {
        self.sort();
        self.quads.dedup();
    }

    /// All distinct blank node labels mentioned anywhere in the set,
    /// in first-occurrence order
    pub fn blank_labels(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut labels = Vec::new();
        for quad in &self.quads {
            for term in quad.blank_positions() {
                if let Some(b) = term.as_blank() {
                    if seen.insert(b.as_str().to_string()) {
                        labels.push(b.as_str().to_string());
                    }
                }
            }
        }
        labels
    }
}

impl FromIterator<Quad> for QuadSet {
    fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
        Self {
            quads: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a QuadSet {
    type Item = &'a Quad;
    type IntoIter = std::slice::Iter<'a, Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QuadSet {
        let mut quads = QuadSet::new();
        quads.add_triple(
            Term::blank("x"),
            Term::iri("http://example.org/knows"),
            Term::blank("y"),
        );
        quads.add_triple(
            Term::iri("http://example.org/alice"),
            Term::iri("http://example.org/knows"),
            Term::blank("x"),
        );
        quads
    }

    #[test]
    fn test_blank_labels_first_occurrence_order() {
        let quads = sample();
        assert_eq!(quads.blank_labels(), vec!["x", "y"]);
    }

    #[test]
    fn test_dedupe() {
        let mut quads = sample();
        let dup = quads.iter().next().unwrap().clone();
        quads.add(dup);
        assert_eq!(quads.len(), 3);
        quads.dedupe();
        assert_eq!(quads.len(), 2);
    }
}
