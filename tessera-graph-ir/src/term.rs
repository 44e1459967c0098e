//! RDF term types: IRI, blank node, and literal
//!
//! Terms fill the subject, predicate, object, and graph-name positions of a
//! quad. A term is:
//! - an IRI (always expanded, never prefixed),
//! - a blank node (label meaningful only within one dataset), or
//! - a literal (lexical form + explicit datatype IRI + optional language).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tessera_vocab::xsd;

/// Blank node label
///
/// Labels are stable within one dataset but carry no global meaning.
/// The stored label never includes the `_:` prefix; serializers add it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankLabel(Arc<str>);

impl BlankLabel {
    /// Create a blank node label. `label` must NOT include the `_:` prefix.
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// Get the bare label (without `_:` prefix)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlankLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// An RDF term
///
/// # Invariants
///
/// - `Term::Iri` always contains an expanded IRI, never a compact form.
/// - A literal with a language tag has datatype `rdf:langString`.
/// - The predicate position of a quad can only be `Term::Iri`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Full expanded IRI (e.g. "http://schema.org/Person")
    Iri(Arc<str>),

    /// Blank node
    Blank(BlankLabel),

    /// Literal with lexical form and explicit datatype
    Literal {
        /// Lexical form of the value
        lexical: Arc<str>,
        /// Datatype IRI (always present)
        datatype: Arc<str>,
        /// Language tag (only when datatype is rdf:langString)
        language: Option<Arc<str>>,
    },
}

impl Term {
    /// Create an IRI term from an expanded IRI string
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    /// Create a blank node term from a bare label
    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::Blank(BlankLabel::new(label))
    }

    /// Create a plain string literal (xsd:string)
    pub fn string(lexical: impl AsRef<str>) -> Self {
        Term::typed(lexical, xsd::STRING)
    }

    /// Create a typed literal
    pub fn typed(lexical: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            datatype: Arc::from(datatype.as_ref()),
            language: None,
        }
    }

    /// Create a language-tagged string literal (rdf:langString)
    pub fn lang_string(lexical: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            datatype: Arc::from(tessera_vocab::rdf::LANG_STRING),
            language: Some(Arc::from(lang.as_ref())),
        }
    }

    /// Check if this is an IRI term
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    /// Check if this is a blank node
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// Try to get as IRI string
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Try to get as blank node label
    pub fn as_blank(&self) -> Option<&BlankLabel> {
        match self {
            Term::Blank(label) => Some(label),
            _ => None,
        }
    }

    /// Try to get literal components (lexical, datatype, language)
    pub fn as_literal(&self) -> Option<(&str, &str, Option<&str>)> {
        match self {
            Term::Literal {
                lexical,
                datatype,
                language,
            } => Some((lexical, datatype, language.as_deref())),
            _ => None,
        }
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        // Type ordering: Blank < Iri < Literal
        let type_ord = |t: &Term| -> u8 {
            match t {
                Term::Blank(_) => 0,
                Term::Iri(_) => 1,
                Term::Literal { .. } => 2,
            }
        };

        match type_ord(self).cmp(&type_ord(other)) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match (self, other) {
            (Term::Iri(a), Term::Iri(b)) => a.cmp(b),
            (Term::Blank(a), Term::Blank(b)) => a.cmp(b),
            (
                Term::Literal {
                    lexical: l1,
                    datatype: d1,
                    language: g1,
                },
                Term::Literal {
                    lexical: l2,
                    datatype: d2,
                    language: g2,
                },
            ) => (d1, g1, l1).cmp(&(d2, g2, l2)),
            _ => Ordering::Equal,
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Blank(label) => write!(f, "{}", label),
            Term::Literal {
                lexical,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", crate::nquads::escape(lexical))?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)
                } else if datatype.as_ref() != xsd::STRING {
                    write!(f, "^^<{}>", datatype)
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_label() {
        let label = BlankLabel::new("b0");
        assert_eq!(label.as_str(), "b0");
        assert_eq!(format!("{}", label), "_:b0");
    }

    #[test]
    fn test_term_constructors() {
        let iri = Term::iri("http://example.org/foo");
        assert!(iri.is_iri());
        assert_eq!(iri.as_iri(), Some("http://example.org/foo"));

        let blank = Term::blank("b0");
        assert!(blank.is_blank());

        let lang = Term::lang_string("bonjour", "fr");
        let (lex, dt, l) = lang.as_literal().unwrap();
        assert_eq!(lex, "bonjour");
        assert_eq!(dt, tessera_vocab::rdf::LANG_STRING);
        assert_eq!(l, Some("fr"));
    }

    #[test]
    fn test_term_ordering() {
        let blank = Term::blank("b0");
        let iri = Term::iri("http://example.org");
        let lit = Term::string("hello");

        assert!(blank < iri);
        assert!(iri < lit);

        let iri_a = Term::iri("http://a.org");
        let iri_b = Term::iri("http://b.org");
        assert!(iri_a < iri_b);
    }

    #[test]
    fn test_term_display() {
        assert_eq!(
            format!("{}", Term::iri("http://example.org")),
            "<http://example.org>"
        );
        assert_eq!(format!("{}", Term::blank("b0")), "_:b0");
        assert_eq!(format!("{}", Term::string("hello")), "\"hello\"");
        assert_eq!(
            format!("{}", Term::lang_string("bonjour", "fr")),
            "\"bonjour\"@fr"
        );
        assert_eq!(
            format!("{}", Term::typed("42", tessera_vocab::xsd::INTEGER)),
            "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }
}
