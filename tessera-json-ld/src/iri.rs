//! IRI syntax helpers shared by expansion and compaction

/// Split a compact IRI like "schema:name" into (prefix, suffix).
///
/// Returns None for absolute IRIs ("http://..." has a suffix starting
/// with "//") and for plain terms with no colon. The degenerate
/// ":suffix" form keeps ":" as its prefix.
pub fn parse_prefix(s: &str) -> Option<(&str, &str)> {
    if let Some(suffix) = s.strip_prefix(':') {
        if suffix.is_empty() {
            return None;
        }
        return Some((":", suffix));
    }

    let colon = s.find(':')?;
    let (prefix, suffix) = (&s[..colon], &s[colon + 1..]);
    if prefix.is_empty() || prefix.contains('/') || suffix.starts_with("//") {
        return None;
    }
    Some((prefix, suffix))
}

/// Check for a colon anywhere (compact or absolute IRI shape)
pub fn looks_like_iri(s: &str) -> bool {
    s.contains(':')
}

/// Check for an RFC 3986 scheme prefix
///
/// Accepts any scheme (`http`, `urn`, `did`, `mailto`, ...) rather than
/// keeping a hardcoded list. Compact IRIs also pass this check; callers
/// that care try [`parse_prefix`] first.
pub fn is_absolute(iri: &str) -> bool {
    match iri.find(':') {
        Some(colon) => {
            let scheme = &iri[..colon];
            !scheme.is_empty()
                && scheme.as_bytes()[0].is_ascii_alphabetic()
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
        }
        None => false,
    }
}

/// Ensure a namespace IRI ends with '/' or '#'
pub fn add_trailing_slash(iri: &str) -> String {
    if iri.ends_with('/') || iri.ends_with('#') {
        iri.to_string()
    } else {
        format!("{}/", iri)
    }
}

/// Resolve a relative reference against a base IRI
///
/// Fragments attach to the base without its trailing slash; absolute
/// references pass through; anything else appends to the base path.
pub fn join(base: &str, relative: &str) -> String {
    if relative.starts_with('#') {
        format!("{}{}", base.trim_end_matches('/'), relative)
    } else if is_absolute(relative) {
        relative.to_string()
    } else {
        format!("{}{}", add_trailing_slash(base), relative)
    }
}
