use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};

use super::stopwords::is_stopword;

/// English Snowball stemmer for terms and multi-word phrases.
pub struct PhraseStemmer {
    stemmer: Stemmer,
}

impl Clone for PhraseStemmer {
    fn clone(&self) -> Self {
        // Stemmer is not Clone, build a fresh one
        Self::new()
    }
}

impl std::fmt::Debug for PhraseStemmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseStemmer")
            .field("algorithm", &"English")
            .finish()
    }
}

impl Default for PhraseStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseStemmer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Lowercase and stem a single word.
    pub fn stem(&self, word: &str) -> String {
        self.stemmer.stem(&word.to_lowercase()).into_owned()
    }

    /// Canonical key of a phrase: each part stemmed, stopword stems dropped,
    /// the rest sorted alphabetically and joined by a single space.
    ///
    /// "Los Angeles" and "angeles los" map to the same key.
    pub fn stem_phrase(&self, phrase: &str) -> String {
        let stems: Vec<String> = phrase.split_whitespace().map(|part| self.stem(part)).collect();
        canonical(&stems.join(" "))
    }

    /// Canonical keys for a set of phrases.
    pub fn stem_all<'a, I>(&self, phrases: I) -> HashSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        phrases
            .into_iter()
            .map(|p| self.stem_phrase(p))
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Canonical form of already stemmed, space separated terms.
pub fn canonical(stems: &str) -> String {
    let mut parts: Vec<&str> = stems.split_whitespace().filter(|s| !is_stopword(s)).collect();
    parts.sort_unstable();
    parts.join(" ")
}
