use serde::{Deserialize, Serialize};

use super::bag::Bag;

/// Numeric features describing one candidate within its document.
///
/// Positions are relative to the document length, so every feature is
/// comparable across documents of different size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateFeatures {
    pub term_count: f64,
    pub char_length: f64,
    pub count: f64,
    pub frequency: f64,
    pub first_position: f64,
    pub last_position: f64,
    pub spread: f64,
    pub first_sentence: f64,
    pub idf: f64,
    pub tfidf: f64,
    pub prior: f64,
    pub variation_count: f64,
    pub uppercase_ratio: f64,
    pub contains_digit: f64,
    pub max_correlation: f64,
    pub sum_correlation: f64,
}

impl CandidateFeatures {
    pub const LEN: usize = 16;

    pub fn names() -> [&'static str; Self::LEN] {
        [
            "term_count",
            "char_length",
            "count",
            "frequency",
            "first_position",
            "last_position",
            "spread",
            "first_sentence",
            "idf",
            "tfidf",
            "prior",
            "variation_count",
            "uppercase_ratio",
            "contains_digit",
            "max_correlation",
            "sum_correlation",
        ]
    }

    /// Feature values in the order of [`CandidateFeatures::names`].
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.term_count,
            self.char_length,
            self.count,
            self.frequency,
            self.first_position,
            self.last_position,
            self.spread,
            self.first_sentence,
            self.idf,
            self.tfidf,
            self.prior,
            self.variation_count,
            self.uppercase_ratio,
            self.contains_digit,
            self.max_correlation,
            self.sum_correlation,
        ]
    }
}

/// All occurrences of one phrase in a document, merged by canonical stem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Most frequent surface form, lowercased.
    pub value: String,
    /// Stems in text order, space separated.
    pub stem: String,
    /// Canonical stem used for corpus lookups.
    pub key: String,
    /// Text positions of all occurrences, ascending.
    pub positions: Vec<usize>,
    /// Sentence numbers of all occurrences.
    pub sentences: Vec<usize>,
    /// Surface forms as written, with counts.
    pub variations: Bag,
    pub features: CandidateFeatures,
    pub regression_value: f64,
    pub positive: bool,
}

impl Candidate {
    pub fn new(key: &str) -> Self {
        Self {
            value: String::new(),
            stem: String::new(),
            key: key.to_string(),
            positions: Vec::new(),
            sentences: Vec::new(),
            variations: Bag::new(),
            features: CandidateFeatures::default(),
            regression_value: 0.0,
            positive: false,
        }
    }

    pub fn count(&self) -> usize {
        self.positions.len()
    }

    pub fn first_position(&self) -> usize {
        self.positions.first().copied().unwrap_or(0)
    }

    pub fn last_position(&self) -> usize {
        self.positions.last().copied().unwrap_or(0)
    }

    /// Share of occurrences written with a leading uppercase letter.
    pub fn uppercase_ratio(&self) -> f64 {
        let total = self.variations.total();
        if total == 0 {
            return 0.0;
        }
        let upper: usize = self
            .variations
            .iter()
            .filter(|(form, _)| form.chars().next().is_some_and(char::is_uppercase))
            .map(|(_, n)| n)
            .sum();
        upper as f64 / total as f64
    }

    /// Pick the most frequent lowercase surface form as the display value.
    pub fn consolidate_value(&mut self) {
        let mut lower = Bag::new();
        for (form, n) in self.variations.iter() {
            lower.add_n(&form.to_lowercase(), n);
        }
        if let Some((best, _)) = lower.sorted_by_count().into_iter().next() {
            self.value = best;
        }
    }
}
