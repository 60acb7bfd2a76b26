use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Counted multiset of strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bag {
    counts: HashMap<String, usize>,
    total: usize,
}

impl Bag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: &str) {
        self.add_n(item, 1);
    }

    pub fn add_n(&mut self, item: &str, n: usize) {
        if n == 0 {
            return;
        }
        *self.counts.entry(item.to_string()).or_insert(0) += n;
        self.total += n;
    }

    /// Add every item of an iterator once.
    pub fn add_all<'a, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for item in items {
            self.add(item);
        }
    }

    pub fn count(&self, item: &str) -> usize {
        self.counts.get(item).copied().unwrap_or(0)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.counts.contains_key(item)
    }

    /// Number of distinct items.
    pub fn unique_len(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Items sorted by descending count, ties alphabetically.
    pub fn sorted_by_count(&self) -> Vec<(String, usize)> {
        let mut items: Vec<(String, usize)> =
            self.counts.iter().map(|(k, &v)| (k.clone(), v)).collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        items
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.total = 0;
    }
}
