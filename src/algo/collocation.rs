//! Detection of frequent multi-word phrases ("New York Times", "machine learning").
//!
//! Longer collocations are preferred: grams are built from the longest size
//! down to bigrams, and a shorter phrase is dropped when an accepted longer
//! one already covers most of its occurrences.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::bag::Bag;
use super::stopwords::is_stopword;
use super::tokenizer::Token;

static STEM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{2,}$").expect("static pattern"));

/// A collocation must occur more often than this.
const MIN_OCCURRENCES: usize = 2;

/// Minimum ratio of collocation occurrences to the rarest contained stem.
const MIN_SCORE: f64 = 0.5;

/// A longer accepted collocation with at least this share of the shorter
/// one's occurrences suppresses it.
const CONTAINMENT_RATIO: f64 = 0.55;

/// Build collocation tokens of `min_len..=max_len` words from word tokens.
///
/// Unigrams are never returned; `min_len` below 2 is treated as 2.
pub fn collocations(tokens: &[Token], min_len: usize, max_len: usize) -> Vec<Token> {
    let min_len = min_len.max(2);
    let max_len = max_len.min(tokens.len());
    if max_len < min_len || tokens.len() < min_len {
        return Vec::new();
    }

    let mut single_stems = Bag::new();
    for token in tokens {
        single_stems.add(&token.stem);
    }

    let mut result: Vec<Token> = Vec::new();
    let mut accepted = Bag::new();

    for n in (min_len..=max_len).rev() {
        let mut groups: HashMap<String, Vec<Token>> = HashMap::new();

        for window in tokens.windows(n) {
            if let Some(gram) = make_gram(window) {
                groups.entry(gram.stem.clone()).or_default().push(gram);
            }
        }

        let mut keys: Vec<&String> = groups.keys().collect();
        keys.sort();
        let mut newly_accepted: Vec<(String, usize)> = Vec::new();

        for stem in keys {
            let grams = &groups[stem];
            let occurrences = grams.len();
            let min_count = stem
                .split(' ')
                .map(|s| single_stems.count(s))
                .min()
                .unwrap_or(0);

            let covered = accepted.iter().any(|(existing, count)| {
                existing.contains(stem.as_str())
                    && count as f64 >= occurrences as f64 * CONTAINMENT_RATIO
            });

            let score = if min_count == 0 {
                0.0
            } else {
                occurrences as f64 / min_count as f64
            };

            if !covered && occurrences > MIN_OCCURRENCES && score > MIN_SCORE {
                result.extend(grams.iter().cloned());
                newly_accepted.push((stem.clone(), occurrences));
            }
        }

        for (stem, count) in newly_accepted {
            accepted.add_n(&stem, count);
        }
    }

    result.sort_by(|a, b| {
        a.text_position
            .cmp(&b.text_position)
            .then_with(|| b.term_count().cmp(&a.term_count()))
    });
    result
}

/// Join a window of word tokens into one collocation token, or `None` when the
/// window starts or ends with a stopword, crosses a sentence boundary or
/// contains a non-alphanumeric stem.
fn make_gram(window: &[Token]) -> Option<Token> {
    let first = window.first()?;
    let last = window.last()?;
    if is_stopword(&first.value.to_lowercase()) || is_stopword(&last.value.to_lowercase()) {
        return None;
    }
    if window
        .iter()
        .any(|t| t.sentence_number != first.sentence_number || !STEM_PATTERN.is_match(&t.stem))
    {
        return None;
    }

    let value = window
        .iter()
        .map(|t| t.value.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let stem = window
        .iter()
        .map(|t| t.stem.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Some(Token {
        value,
        stem,
        text_position: first.text_position,
        sentence_position: first.sentence_position,
        sentence_number: first.sentence_number,
    })
}
