use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::bag::Bag;
use super::correlation::WordCorrelationMatrix;

/// Collection statistics for keyphrase extraction: document frequencies of
/// candidate phrases, keyphrase prior counts and keyphrase co-occurrences.
///
/// All keys are canonical stems (see [`super::stem::canonical`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    /// phrase -> number of documents containing it
    doc_freq: Bag,
    /// total number of documents
    num_docs: usize,
    /// keyphrase -> number of documents it was assigned to
    keyphrases: Bag,
    /// number of documents with at least one keyphrase
    keyphrase_docs: usize,
    /// co-occurrences of assigned keyphrases
    correlations: WordCorrelationMatrix,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one document given the phrase keys it contains. Repeated keys count once.
    pub fn add_document<'a, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique: HashSet<&str> = keys.into_iter().filter(|k| !k.is_empty()).collect();
        for key in unique {
            self.doc_freq.add(key);
        }
        self.num_docs += 1;
    }

    /// Record the keyphrases manually assigned to one document.
    pub fn add_keyphrases(&mut self, keyphrases: &HashSet<String>) {
        if keyphrases.is_empty() {
            return;
        }
        for k in keyphrases {
            self.keyphrases.add(k);
        }
        let group: Vec<&str> = keyphrases.iter().map(String::as_str).collect();
        self.correlations.update_group(&group);
        self.keyphrase_docs += 1;
    }

    /// IDF: ln(N / (df + 1)), never negative.
    pub fn idf(&self, key: &str) -> f64 {
        if self.num_docs == 0 {
            return 0.0;
        }
        let df = self.doc_freq.count(key) as f64;
        (self.num_docs as f64 / (df + 1.0)).ln().max(0.0)
    }

    /// Share of keyphrase documents this phrase was assigned to.
    pub fn prior(&self, key: &str) -> f64 {
        if self.keyphrase_docs == 0 {
            return 0.0;
        }
        self.keyphrases.count(key) as f64 / self.keyphrase_docs as f64
    }

    /// Relative correlation between two keyphrases.
    pub fn correlation(&self, a: &str, b: &str) -> f64 {
        self.correlations.relative(a, b)
    }

    pub fn make_relative_scores(&mut self) {
        self.correlations.make_relative_scores();
    }

    pub fn correlations(&self) -> &WordCorrelationMatrix {
        &self.correlations
    }

    /// Most frequently assigned keyphrases.
    pub fn top_keyphrases(&self, n: usize) -> Vec<(String, usize)> {
        let mut sorted = self.keyphrases.sorted_by_count();
        sorted.truncate(n);
        sorted
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    pub fn keyphrase_docs(&self) -> usize {
        self.keyphrase_docs
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
