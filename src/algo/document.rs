use std::collections::HashMap;

use super::candidate::Candidate;
use super::corpus::Corpus;
use super::stem::canonical;
use super::tokenizer::Token;

/// Keyphrase candidates of one document with their features.
#[derive(Debug, Clone, Default)]
pub struct DocumentModel {
    candidates: Vec<Candidate>,
    word_count: usize,
    sentence_count: usize,
}

impl DocumentModel {
    /// Consolidate tokens (words and collocations) into candidates, merging
    /// occurrences with the same canonical stem, and compute their features
    /// against the corpus.
    pub fn new(tokens: &[Token], corpus: &Corpus) -> Self {
        let word_count = tokens
            .iter()
            .map(|t| t.text_position + t.term_count())
            .max()
            .unwrap_or(0);
        let sentence_count = tokens
            .iter()
            .map(|t| t.sentence_number + 1)
            .max()
            .unwrap_or(0);

        let mut by_key: HashMap<String, Candidate> = HashMap::new();
        for token in tokens {
            let key = canonical(&token.stem);
            if key.is_empty() {
                continue;
            }
            let candidate = by_key
                .entry(key.clone())
                .or_insert_with(|| Candidate::new(&key));
            if candidate.stem.is_empty() {
                candidate.stem = token.stem.clone();
            }
            candidate.positions.push(token.text_position);
            candidate.sentences.push(token.sentence_number);
            candidate.variations.add(&token.value);
        }

        let mut candidates: Vec<Candidate> = by_key.into_values().collect();
        for candidate in &mut candidates {
            candidate.positions.sort_unstable();
            candidate.sentences.sort_unstable();
            candidate.consolidate_value();
        }
        candidates.sort_by(|a, b| {
            a.first_position()
                .cmp(&b.first_position())
                .then_with(|| a.key.cmp(&b.key))
        });

        let mut model = Self {
            candidates,
            word_count,
            sentence_count,
        };
        model.compute_features(corpus);
        model
    }

    fn compute_features(&mut self, corpus: &Corpus) {
        let length = self.word_count.max(1) as f64;
        let sentences = self.sentence_count.max(1) as f64;
        for c in &mut self.candidates {
            let count = c.count() as f64;
            let frequency = count / length;
            let idf = corpus.idf(&c.key);
            let uppercase_ratio = c.uppercase_ratio();
            let f = &mut c.features;
            f.term_count = c.value.split_whitespace().count() as f64;
            f.char_length = c.value.chars().count() as f64;
            f.count = count;
            f.frequency = frequency;
            f.first_position = c.positions.first().copied().unwrap_or(0) as f64 / length;
            f.last_position = c.positions.last().copied().unwrap_or(0) as f64 / length;
            f.spread = f.last_position - f.first_position;
            f.first_sentence = c.sentences.first().copied().unwrap_or(0) as f64 / sentences;
            f.idf = idf;
            f.tfidf = frequency * idf;
            f.prior = corpus.prior(&c.key);
            f.variation_count = c.variations.unique_len() as f64;
            f.uppercase_ratio = uppercase_ratio;
            f.contains_digit = if c.value.chars().any(|ch| ch.is_ascii_digit()) {
                1.0
            } else {
                0.0
            };
        }
    }

    /// Drop candidates that were never assigned as a keyphrase in the corpus.
    pub fn remove_non_keyphrases(&mut self) {
        self.candidates.retain(|c| c.features.prior > 0.0);
    }

    /// Fill the correlation features from keyphrase co-occurrences between
    /// the candidates of this document.
    pub fn calculate_correlations(&mut self, corpus: &Corpus) {
        let keys: Vec<String> = self.candidates.iter().map(|c| c.key.clone()).collect();
        for (i, candidate) in self.candidates.iter_mut().enumerate() {
            let mut sum = 0.0;
            let mut max: f64 = 0.0;
            for (j, other) in keys.iter().enumerate() {
                if i == j {
                    continue;
                }
                let rel = corpus.correlation(&candidate.key, other);
                sum += rel;
                max = max.max(rel);
            }
            candidate.features.sum_correlation = sum;
            candidate.features.max_correlation = max;
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidates_mut(&mut self) -> &mut Vec<Candidate> {
        &mut self.candidates
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
