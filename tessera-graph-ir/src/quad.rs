//! RDF quad: subject-predicate-object triple plus an optional graph name

use crate::Term;
use serde::{Deserialize, Serialize};

/// An RDF quad
///
/// `g` is `None` for the default graph. Subjects may be IRIs or blank
/// nodes, predicates only IRIs, objects any term, graph names IRIs or
/// blank nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quad {
    /// Subject (IRI or blank node)
    pub s: Term,
    /// Predicate (IRI)
    pub p: Term,
    /// Object (any term)
    pub o: Term,
    /// Graph name (None = default graph)
    pub g: Option<Term>,
}

impl Quad {
    /// Create a quad with an explicit graph name
    pub fn new(s: Term, p: Term, o: Term, g: Option<Term>) -> Self {
        Self { s, p, o, g }
    }

    /// Create a quad in the default graph
    pub fn triple(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o, g: None }
    }

    /// Iterate the positions that may hold blank nodes (subject, object,
    /// graph name); predicates never do.
    pub fn blank_positions(&self) -> impl Iterator<Item = &Term> {
        [Some(&self.s), Some(&self.o), self.g.as_ref()]
            .into_iter()
            .flatten()
            .filter(|t| t.is_blank())
    }

    /// Check whether any position mentions the given blank label
    pub fn mentions_blank(&self, label: &str) -> bool {
        self.blank_positions()
            .any(|t| t.as_blank().map(|b| b.as_str()) == Some(label))
    }
}
