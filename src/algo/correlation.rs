//! Symmetric co-occurrence matrix between terms (tags, keyphrase stems).
//!
//! Absolute scores count how often two terms were assigned together.
//! Relative scores normalise by how often either term occurs with anything:
//! `rel(a, b) = abs(a, b) / (row(a) + row(b) - abs(a, b))`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Correlation between two terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WordCorrelation {
    pub absolute: f64,
    pub relative: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordCorrelationMatrix {
    /// term -> partner -> correlation; both directions are stored
    matrix: HashMap<String, HashMap<String, WordCorrelation>>,
    /// number of distinct unordered pairs
    pairs: usize,
}

impl WordCorrelationMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one co-occurrence of `a` and `b`.
    pub fn update_pair(&mut self, a: &str, b: &str) {
        let entry = self
            .matrix
            .entry(a.to_string())
            .or_default()
            .entry(b.to_string())
            .or_default();
        if entry.absolute == 0.0 {
            self.pairs += 1;
        }
        entry.absolute += 1.0;
        if a != b {
            self.matrix
                .entry(b.to_string())
                .or_default()
                .entry(a.to_string())
                .or_default()
                .absolute += 1.0;
        }
    }

    /// Count co-occurrences for every unordered pair of distinct terms in a group.
    pub fn update_group<S: AsRef<str>>(&mut self, terms: &[S]) {
        let mut sorted: Vec<&str> = terms.iter().map(|t| t.as_ref()).collect();
        sorted.sort_unstable();
        sorted.dedup();
        for i in 0..sorted.len() {
            for j in (i + 1)..sorted.len() {
                self.update_pair(sorted[i], sorted[j]);
            }
        }
    }

    /// Sum of absolute co-occurrences of a term with every partner.
    pub fn row_sum(&self, term: &str) -> f64 {
        self.matrix
            .get(term)
            .map(|row| row.values().map(|c| c.absolute).sum())
            .unwrap_or(0.0)
    }

    /// Recompute all relative scores from the absolute counts.
    pub fn make_relative_scores(&mut self) {
        let row_sums: HashMap<String, f64> = self
            .matrix
            .iter()
            .map(|(term, row)| (term.clone(), row.values().map(|c| c.absolute).sum()))
            .collect();

        for (a, row) in self.matrix.iter_mut() {
            let sum_a = row_sums.get(a).copied().unwrap_or(0.0);
            for (b, corr) in row.iter_mut() {
                let denominator = if a == b {
                    sum_a
                } else {
                    sum_a + row_sums.get(b).copied().unwrap_or(0.0) - corr.absolute
                };
                corr.relative = if denominator > 0.0 {
                    corr.absolute / denominator
                } else {
                    0.0
                };
            }
        }
    }

    pub fn correlation(&self, a: &str, b: &str) -> Option<WordCorrelation> {
        self.matrix.get(a).and_then(|row| row.get(b)).copied()
    }

    /// Relative correlation, 0 when the pair was never seen.
    pub fn relative(&self, a: &str, b: &str) -> f64 {
        self.correlation(a, b).map(|c| c.relative).unwrap_or(0.0)
    }

    /// Partners of `term` co-occurring at least `min_cooccurrences` times.
    pub fn correlations(&self, term: &str, min_cooccurrences: usize) -> Vec<(String, WordCorrelation)> {
        let mut result: Vec<(String, WordCorrelation)> = self
            .matrix
            .get(term)
            .map(|row| {
                row.iter()
                    .filter(|(_, c)| c.absolute >= min_cooccurrences as f64)
                    .map(|(b, c)| (b.clone(), *c))
                    .collect()
            })
            .unwrap_or_default();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }

    /// The `n` partners with the highest relative correlation.
    pub fn highest(&self, term: &str, n: usize) -> Vec<(String, f64)> {
        let mut result: Vec<(String, f64)> = self
            .correlations(term, 1)
            .into_iter()
            .filter(|(b, _)| b != term)
            .map(|(b, c)| (b, c.relative))
            .collect();
        result.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        result.truncate(n);
        result
    }

    /// `P(term | given)` with add-one smoothing over the vocabulary.
    pub fn conditional_probability_laplace(&self, term: &str, given: &str) -> f64 {
        let joint = self.correlation(term, given).map(|c| c.absolute).unwrap_or(0.0);
        let vocabulary = self.matrix.len() as f64;
        let denominator = self.row_sum(given) + vocabulary;
        if denominator == 0.0 {
            return 0.0;
        }
        (joint + 1.0) / denominator
    }

    /// Number of distinct term pairs.
    pub fn len(&self) -> usize {
        self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }

    /// Number of distinct terms.
    pub fn vocabulary_len(&self) -> usize {
        self.matrix.len()
    }

    pub fn clear(&mut self) {
        self.matrix.clear();
        self.pairs = 0;
    }
}
