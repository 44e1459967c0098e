//! Canonical N-Quads serialization
//!
//! One quad per line, `<s> <p> <o> <g>? .`, literals with strict escaping,
//! lines sorted byte-wise. Equal quad multisets always produce identical
//! text, which is what the canonicalizer's hashing relies on.

use crate::{Quad, QuadSet, Term};
use sha2::{Digest, Sha256};

/// Escape a literal lexical form for N-Quads
///
/// `"`, `\`, LF and CR get two-character escapes; all other control
/// characters become `\uXXXX` with uppercase hex.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c < '\u{0020}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// Render a single quad as an N-Quads line (without trailing newline)
pub fn format_quad(quad: &Quad) -> String {
    match &quad.g {
        Some(g) => format!("{} {} {} {} .", quad.s, quad.p, quad.o, g),
        None => format!("{} {} {} .", quad.s, quad.p, quad.o),
    }
}

/// Render a quad with blank node labels rewritten through `relabel`
///
/// The canonicalizer uses this both for hash inputs (placeholder
/// substitution) and for the final canonical rewrite.
pub fn format_quad_relabeled(quad: &Quad, relabel: &dyn Fn(&str) -> String) -> String {
    let term = |t: &Term| -> String {
        match t {
            Term::Blank(label) => format!("_:{}", relabel(label.as_str())),
            other => other.to_string(),
        }
    };
    match &quad.g {
        Some(g) => format!(
            "{} {} {} {} .",
            term(&quad.s),
            term(&quad.p),
            term(&quad.o),
            term(g)
        ),
        None => format!("{} {} {} .", term(&quad.s), term(&quad.p), term(&quad.o)),
    }
}

/// Serialize a quad set as canonical N-Quads text
///
/// Lines are sorted by byte-wise lexicographic order, each terminated by
/// a newline.
pub fn serialize(quads: &QuadSet) -> String {
    let mut lines: Vec<String> = quads.iter().map(format_quad).collect();
    lines.sort_unstable();
    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Hex-encoded SHA-256 digest of canonical text
pub fn digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape("back\\slash"), "back\\\\slash");
        assert_eq!(escape("line\nbreak\r"), "line\\nbreak\\r");
        assert_eq!(escape("tab\there"), "tab\\u0009here");
    }

    #[test]
    fn test_format_quad_default_graph() {
        let q = Quad::triple(
            Term::iri("http://example.org/s"),
            Term::iri("http://example.org/p"),
            Term::string("o"),
        );
        assert_eq!(
            format_quad(&q),
            "<http://example.org/s> <http://example.org/p> \"o\" ."
        );
    }

    #[test]
    fn test_format_quad_named_graph() {
        let q = Quad::new(
            Term::blank("b0"),
            Term::iri("http://example.org/p"),
            Term::typed("1", tessera_vocab::xsd::INTEGER),
            Some(Term::iri("http://example.org/g")),
        );
        assert_eq!(
            format_quad(&q),
            "_:b0 <http://example.org/p> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer> <http://example.org/g> ."
        );
    }

    #[test]
    fn test_serialize_sorts_lines() {
        let mut quads = QuadSet::new();
        quads.add_triple(
            Term::iri("http://example.org/b"),
            Term::iri("http://example.org/p"),
            Term::string("2"),
        );
        quads.add_triple(
            Term::iri("http://example.org/a"),
            Term::iri("http://example.org/p"),
            Term::string("1"),
        );

        let text = serialize(&quads);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("<http://example.org/a>"));
        assert!(lines[1].starts_with("<http://example.org/b>"));
        assert!(text.ends_with(".\n"));
    }

    #[test]
    fn test_relabeled_formatting() {
        let q = Quad::triple(
            Term::blank("x"),
            Term::iri("http://example.org/p"),
            Term::blank("y"),
        );
        let line = format_quad_relabeled(&q, &|label| {
            if label == "x" {
                "a".to_string()
            } else {
                "z".to_string()
            }
        });
        assert_eq!(line, "_:a <http://example.org/p> _:z .");
    }

    #[test]
    fn test_digest_stable() {
        let d1 = digest("abc\n");
        let d2 = digest("abc\n");
        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 64);
        assert_ne!(digest("abc\n"), digest("abd\n"));
    }
}
