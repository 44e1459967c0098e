//! Permutation enumeration for the n-degree search
//!
//! Heap's algorithm: each step swaps exactly two elements, no allocation
//! beyond the yielded clone. Enumeration order is deterministic but not
//! lexicographic; callers take the minimum over all permutations, so the
//! order never shows in output.

/// Iterate every permutation of `items`.
pub fn permutations(items: &[String]) -> Permutations {
    Permutations {
        c: vec![0; items.len()],
        items: items.to_vec(),
        i: 0,
        first: true,
        done: false,
    }
}

pub struct Permutations {
    items: Vec<String>,
    c: Vec<usize>,
    i: usize,
    first: bool,
    done: bool,
}

impl Iterator for Permutations {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Vec<String>> {
        if self.done {
            return None;
        }
        if self.first {
            self.first = false;
            return Some(self.items.clone());
        }
        let n = self.items.len();
        while self.i < n {
            if self.c[self.i] < self.i {
                if self.i % 2 == 0 {
                    self.items.swap(0, self.i);
                } else {
                    self.items.swap(self.c[self.i], self.i);
                }
                self.c[self.i] += 1;
                self.i = 0;
                return Some(self.items.clone());
            }
            self.c[self.i] = 0;
            self.i += 1;
        }
        self.done = true;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_counts() {
        assert_eq!(permutations(&[]).count(), 1);
        assert_eq!(permutations(&strings(&["a"])).count(), 1);
        assert_eq!(permutations(&strings(&["a", "b"])).count(), 2);
        assert_eq!(permutations(&strings(&["a", "b", "c", "d"])).count(), 24);
    }

    #[test]
    fn test_all_distinct_and_complete() {
        let input = strings(&["a", "b", "c"]);
        let mut all: Vec<Vec<String>> = permutations(&input).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 6);
        for p in &all {
            let mut sorted = p.clone();
            sorted.sort();
            assert_eq!(sorted, input);
        }
    }

    #[test]
    fn test_first_yield_is_input_order() {
        let input = strings(&["x", "y", "z"]);
        assert_eq!(permutations(&input).next(), Some(input));
    }
}
