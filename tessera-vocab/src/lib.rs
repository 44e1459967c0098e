//! RDF vocabulary constants and error codes for Tessera
//!
//! Centralized IRIs used across the JSON-LD pipeline, organized by
//! vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `keyword` - the closed JSON-LD keyword set
//! - `errors` - stable error code strings surfaced in API responses

pub mod errors;

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI (datatype of language-tagged strings)
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    /// rdf:JSON IRI (datatype of @json literals)
    pub const JSON: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#JSON";

    /// rdf:first IRI (RDF list head)
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";

    /// rdf:rest IRI (RDF list tail)
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";

    /// rdf:nil IRI (RDF list terminator)
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
}

/// XSD vocabulary constants
pub mod xsd {
    /// xsd:string IRI - default datatype of plain string literals
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    /// xsd:anyURI IRI
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";
}

/// The closed JSON-LD keyword set
pub mod keyword {
    /// All keywords a conforming processor recognizes. An expanded node
    /// never carries a raw keyword key outside this set.
    pub const ALL: &[&str] = &[
        "@base",
        "@container",
        "@context",
        "@direction",
        "@graph",
        "@id",
        "@index",
        "@json",
        "@language",
        "@list",
        "@nest",
        "@none",
        "@prefix",
        "@protected",
        "@reverse",
        "@set",
        "@type",
        "@value",
        "@version",
        "@vocab",
    ];

    /// Check membership in the closed keyword set
    pub fn is_keyword(s: &str) -> bool {
        ALL.binary_search(&s).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_membership() {
        assert!(keyword::is_keyword("@id"));
        assert!(keyword::is_keyword("@value"));
        assert!(keyword::is_keyword("@version"));
        assert!(!keyword::is_keyword("@bogus"));
        assert!(!keyword::is_keyword("id"));
    }

    #[test]
    fn test_keyword_table_sorted() {
        // binary_search requires the table stays sorted
        let mut sorted = keyword::ALL.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, keyword::ALL);
    }

    #[test]
    fn test_rdf_list_vocabulary() {
        assert!(rdf::FIRST.ends_with("#first"));
        assert!(rdf::REST.ends_with("#rest"));
        assert!(rdf::NIL.ends_with("#nil"));
    }
}
