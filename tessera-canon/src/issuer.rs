//! Sequential identifier issuance for blank node relabeling
//!
//! Issuers are cloned freely during the n-degree search; a path that loses
//! the comparison simply drops its copy.

use rustc_hash::FxHashMap;

/// Issues `{prefix}0`, `{prefix}1`, ... identifiers, one per distinct
/// input, remembering the order of first issuance.
#[derive(Clone, Debug, Default)]
pub struct IdentifierIssuer {
    prefix: String,
    counter: usize,
    issued: FxHashMap<String, String>,
    order: Vec<String>,
}

impl IdentifierIssuer {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            counter: 0,
            issued: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Issue an identifier for `id`, or return the one already issued.
    pub fn issue(&mut self, id: &str) -> String {
        if let Some(existing) = self.issued.get(id) {
            return existing.clone();
        }
        let label = format!("{}{}", self.prefix, self.counter);
        self.counter += 1;
        self.issued.insert(id.to_string(), label.clone());
        self.order.push(id.to_string());
        label
    }

    /// Identifier already issued for `id`, if any.
    pub fn issued(&self, id: &str) -> Option<&str> {
        self.issued.get(id).map(String::as_str)
    }

    /// Input ids in first-issuance order.
    pub fn issued_order(&self) -> &[String] {
        &self.order
    }
}
