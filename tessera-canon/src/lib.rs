//! RDF dataset canonicalization
//!
//! Relabels every blank node in a quad set deterministically so that the
//! serialized output is invariant under blank node relabeling and quad
//! reordering of isomorphic inputs.
//!
//! The algorithm is the standard one: first-degree hashing over each blank
//! node's quads with positional placeholders, immediate canonical labels
//! for unique hashes, and an n-degree permutation search over the related
//! blank node neighborhood for hash collisions. The search is exponential
//! on pathologically symmetric graphs by nature; an iteration budget bounds
//! it and fails with [`CanonError::ToxicGraph`] instead of running
//! unbounded.
//!
//! # Example
//!
//! ```
//! use tessera_canon::{canonicalize, CanonOptions};
//! use tessera_graph_ir::{QuadSet, Quad, Term};
//!
//! let mut quads = QuadSet::new();
//! quads.add_triple(
//!     Term::blank("someone"),
//!     Term::iri("http://xmlns.com/foaf/0.1/name"),
//!     Term::string("Alice"),
//! );
//!
//! let canon = canonicalize(&quads, &CanonOptions::default()).unwrap();
//! assert_eq!(canon.label_map.get("someone").map(String::as_str), Some("c14n0"));
//! ```

mod issuer;
mod permute;

use issuer::IdentifierIssuer;
use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tessera_graph_ir::{nquads, Quad, QuadSet, Term};
use thiserror::Error;
use tracing::{debug, trace};

/// Canonicalization error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonError {
    /// The n-degree search exceeded its iteration budget. Retry with a
    /// larger budget or reject the input; there is no partial result.
    #[error("canonicalization exceeded its iteration budget of {budget}")]
    ToxicGraph { budget: usize },
}

pub type Result<T> = std::result::Result<T, CanonError>;

/// Which standardized hashing variant to use
///
/// The two variants differ in how the related-blank-node hash input is
/// constructed: RDFC-1.0 prefixes issued identifiers with `_:`, URDNA2015
/// uses them bare. They must not be conflated; outputs differ on inputs
/// that reach the n-degree path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CanonVersion {
    #[default]
    Urdna2015,
    Rdfc10,
}

/// Canonicalization options
#[derive(Clone, Debug)]
pub struct CanonOptions {
    /// Hashing variant
    pub version: CanonVersion,
    /// N-degree work budget (permutations + recursion entries). Exceeding
    /// it fails with [`CanonError::ToxicGraph`].
    pub iteration_budget: usize,
}

impl Default for CanonOptions {
    fn default() -> Self {
        Self {
            version: CanonVersion::default(),
            iteration_budget: 100_000,
        }
    }
}

/// Result of one canonicalization call
#[derive(Clone, Debug)]
pub struct Canonicalized {
    /// Input blank node label -> canonical label (`c14n0`, `c14n1`, ...)
    pub label_map: BTreeMap<String, String>,
    /// The input quads rewritten with canonical labels, sorted
    pub quads: QuadSet,
}

impl Canonicalized {
    /// Canonical N-Quads text (sorted lines, trailing newlines)
    pub fn to_nquads(&self) -> String {
        nquads::serialize(&self.quads)
    }

    /// Hex SHA-256 digest over the canonical N-Quads text
    pub fn digest(&self) -> String {
        nquads::digest(&self.to_nquads())
    }
}

/// Canonicalize a quad set
///
/// Output is a pure function of the quad multiset: input label strings and
/// insertion order never influence the canonical text.
pub fn canonicalize(quads: &QuadSet, options: &CanonOptions) -> Result<Canonicalized> {
    let mut state = CanonState::new(quads, options);

    // First-degree hash for every blank node, grouped by hash.
    let mut hash_groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for label in quads.blank_labels() {
        let hash = state.hash_first_degree(&label);
        hash_groups.entry(hash).or_default().push(label);
    }

    // Unique hashes get canonical labels immediately, in digest order.
    for (hash, group) in &hash_groups {
        if group.len() == 1 {
            let canonical = state.canonical.issue(&group[0]);
            trace!(label = %group[0], %canonical, %hash, "unique first-degree hash");
        }
    }

    // Collision groups go through the n-degree search.
    for (hash, group) in &hash_groups {
        if group.len() == 1 {
            continue;
        }
        debug!(%hash, members = group.len(), "resolving first-degree collision");

        let mut results: Vec<(String, IdentifierIssuer)> = Vec::new();
        for label in group {
            if state.canonical.issued(label).is_some() {
                continue;
            }
            let mut temp = IdentifierIssuer::new("b");
            temp.issue(label);
            results.push(state.hash_n_degree(label, temp)?);
        }

        results.sort_by(|a, b| a.0.cmp(&b.0));
        for (_, issuer) in results {
            for label in issuer.issued_order() {
                state.canonical.issue(label);
            }
        }
    }

    // Rewrite every quad with canonical labels.
    let label_map: BTreeMap<String, String> = quads
        .blank_labels()
        .into_iter()
        .map(|label| {
            let canonical = state.canonical.issue(&label);
            (label, canonical)
        })
        .collect();

    let relabel = |t: &Term| -> Term {
        match t {
            Term::Blank(b) => Term::blank(&label_map[b.as_str()]),
            other => other.clone(),
        }
    };
    let mut rewritten: QuadSet = quads
        .iter()
        .map(|q| {
            Quad::new(
                relabel(&q.s),
                q.p.clone(),
                relabel(&q.o),
                q.g.as_ref().map(&relabel),
            )
        })
        .collect();
    rewritten.sort();

    Ok(Canonicalized {
        label_map,
        quads: rewritten,
    })
}

/// Per-call canonicalization state
struct CanonState<'a> {
    quads: Vec<&'a Quad>,
    /// blank label -> indexes of quads mentioning it
    blank_to_quads: FxHashMap<String, Vec<usize>>,
    /// memoized first-degree hashes
    hash1_cache: FxHashMap<String, String>,
    canonical: IdentifierIssuer,
    version: CanonVersion,
    budget: usize,
    remaining: usize,
}

impl<'a> CanonState<'a> {
    fn new(quads: &'a QuadSet, options: &CanonOptions) -> Self {
        let quads: Vec<&Quad> = quads.iter().collect();
        let mut blank_to_quads: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (i, quad) in quads.iter().enumerate() {
            for term in quad.blank_positions() {
                if let Some(b) = term.as_blank() {
                    let entry = blank_to_quads.entry(b.as_str().to_string()).or_default();
                    // A label can appear in several positions of one quad.
                    if entry.last() != Some(&i) {
                        entry.push(i);
                    }
                }
            }
        }
        Self {
            quads,
            blank_to_quads,
            hash1_cache: FxHashMap::default(),
            canonical: IdentifierIssuer::new("c14n"),
            version: options.version,
            budget: options.iteration_budget,
            remaining: options.iteration_budget,
        }
    }

    /// Cooperative budget checkpoint; called before each unit of n-degree
    /// work so a runaway search aborts promptly.
    fn tick(&mut self) -> Result<()> {
        if self.remaining == 0 {
            return Err(CanonError::ToxicGraph {
                budget: self.budget,
            });
        }
        self.remaining -= 1;
        Ok(())
    }

    /// First-degree hash: serialize every quad mentioning `id` with the
    /// reference node as `_:a` and every other blank node as `_:z`, sort,
    /// concatenate, digest.
    fn hash_first_degree(&mut self, id: &str) -> String {
        if let Some(hash) = self.hash1_cache.get(id) {
            return hash.clone();
        }
        let mut lines: Vec<String> = self
            .blank_to_quads
            .get(id)
            .map(|idxs| {
                idxs.iter()
                    .map(|&i| {
                        let mut line = nquads::format_quad_relabeled(self.quads[i], &|label| {
                            if label == id { "a" } else { "z" }.to_string()
                        });
                        line.push('\n');
                        line
                    })
                    .collect()
            })
            .unwrap_or_default();
        lines.sort_unstable();

        let mut hasher = Sha256::new();
        for line in &lines {
            hasher.update(line.as_bytes());
        }
        let hash = hex::encode(hasher.finalize());
        self.hash1_cache.insert(id.to_string(), hash.clone());
        hash
    }

    /// Hash of one related blank node as seen from `id` through `quad`.
    ///
    /// Prefers the canonical identifier, then the path issuer's temporary
    /// identifier, then the related node's first-degree hash.
    fn hash_related(
        &mut self,
        related: &str,
        quad: &Quad,
        position: char,
        issuer: &IdentifierIssuer,
    ) -> String {
        let identifier = if let Some(canonical) = self.canonical.issued(related) {
            self.tag_identifier(canonical)
        } else if let Some(temp) = issuer.issued(related) {
            self.tag_identifier(temp)
        } else {
            self.hash_first_degree(related)
        };

        let mut input = String::new();
        input.push(position);
        if position != 'g' {
            if let Some(p) = quad.p.as_iri() {
                input.push('<');
                input.push_str(p);
                input.push('>');
            }
        }
        input.push_str(&identifier);

        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Version-dependent rendering of an issued identifier in related-hash
    /// input. This is where the two standardized variants diverge.
    fn tag_identifier(&self, id: &str) -> String {
        match self.version {
            CanonVersion::Urdna2015 => id.to_string(),
            CanonVersion::Rdfc10 => format!("_:{}", id),
        }
    }

    /// N-degree hash: explore the related blank node neighborhood of `id`,
    /// trying every ordering of not-yet-fixed neighbors and keeping the
    /// lexicographically smallest path.
    fn hash_n_degree(
        &mut self,
        id: &str,
        mut issuer: IdentifierIssuer,
    ) -> Result<(String, IdentifierIssuer)> {
        self.tick()?;

        // Group related blank nodes by their relation hash.
        let mut hash_to_related: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let quad_idxs = self.blank_to_quads.get(id).cloned().unwrap_or_default();
        for i in quad_idxs {
            let quad = self.quads[i];
            let positions: [(char, Option<&Term>); 3] =
                [('s', Some(&quad.s)), ('o', Some(&quad.o)), ('g', quad.g.as_ref())];
            for (position, term) in positions {
                let Some(related) = term.and_then(|t| t.as_blank()) else {
                    continue;
                };
                let related = related.as_str().to_string();
                if related == id {
                    continue;
                }
                let hash = self.hash_related(&related, quad, position, &issuer);
                let group = hash_to_related.entry(hash).or_default();
                if !group.contains(&related) {
                    group.push(related);
                }
            }
        }

        let mut data = String::new();
        for (related_hash, group) in hash_to_related {
            data.push_str(&related_hash);

            let mut chosen_path = String::new();
            let mut chosen_issuer: Option<IdentifierIssuer> = None;

            for permutation in permute::permutations(&group) {
                self.tick()?;

                let mut issuer_copy = issuer.clone();
                let mut path = String::new();
                let mut recursion_list: Vec<String> = Vec::new();
                let mut abandoned = false;

                for related in &permutation {
                    if let Some(canonical) = self.canonical.issued(related) {
                        path.push_str("_:");
                        path.push_str(&canonical);
                    } else {
                        if issuer_copy.issued(related).is_none() {
                            recursion_list.push(related.clone());
                        }
                        path.push_str("_:");
                        path.push_str(&issuer_copy.issue(related));
                    }
                    if !chosen_path.is_empty()
                        && path.len() >= chosen_path.len()
                        && path.as_str() > chosen_path.as_str()
                    {
                        abandoned = true;
                        break;
                    }
                }
                if abandoned {
                    continue;
                }

                for related in &recursion_list {
                    let (hash, returned_issuer) =
                        self.hash_n_degree(related, issuer_copy.clone())?;
                    path.push_str("_:");
                    path.push_str(&issuer_copy.issue(related));
                    path.push('<');
                    path.push_str(&hash);
                    path.push('>');
                    issuer_copy = returned_issuer;
                    if !chosen_path.is_empty()
                        && path.len() >= chosen_path.len()
                        && path.as_str() > chosen_path.as_str()
                    {
                        abandoned = true;
                        break;
                    }
                }
                if abandoned {
                    continue;
                }

                if chosen_path.is_empty() || path < chosen_path {
                    chosen_path = path;
                    chosen_issuer = Some(issuer_copy);
                }
            }

            data.push_str(&chosen_path);
            if let Some(chosen) = chosen_issuer {
                issuer = chosen;
            }
        }

        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        Ok((hex::encode(hasher.finalize()), issuer))
    }
}
