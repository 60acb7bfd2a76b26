use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use super::stem::PhraseStemmer;

/// A word (or collocation) occurrence inside a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Surface form as it appears in the text.
    pub value: String,
    /// Stemmed form; space-joined stems for collocations.
    pub stem: String,
    /// Index of the (first) word within the whole text.
    pub text_position: usize,
    /// Index of the (first) word within its sentence.
    pub sentence_position: usize,
    /// Zero-based sentence index.
    pub sentence_number: usize,
}

impl Token {
    /// Number of words making up this token.
    pub fn term_count(&self) -> usize {
        self.value.split_whitespace().count()
    }
}

/// Split text into sentences. A text without sentence boundaries is one sentence.
pub fn sentences(text: &str) -> Vec<&str> {
    let result: Vec<&str> = text
        .unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if result.is_empty() && !text.trim().is_empty() {
        vec![text.trim()]
    } else {
        result
    }
}

/// Lowercase word tokens, punctuation removed.
pub fn words(text: &str) -> Vec<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

/// Tokenize text into stemmed word tokens with text and sentence positions.
pub fn tokenize(text: &str, stemmer: &PhraseStemmer) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text_position = 0;
    for (sentence_number, sentence) in sentences(text).into_iter().enumerate() {
        for (sentence_position, word) in sentence.unicode_words().enumerate() {
            tokens.push(Token {
                value: word.to_string(),
                stem: stemmer.stem(word),
                text_position,
                sentence_position,
                sentence_number,
            });
            text_position += 1;
        }
    }
    tokens
}

/// Word n-grams concatenated without separator, so that a text mentioning
/// "Los Angeles" can match the single vocabulary entry "losangeles".
pub fn concatenated_grams(words: &[String], n: usize) -> Vec<String> {
    if n == 0 || words.len() < n {
        return Vec::new();
    }
    words
        .windows(n)
        .map(|w| w.concat())
        .filter(|g| !g.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_lowercase_without_punctuation() {
        assert_eq!(words("Hello, World! Rust."), vec!["hello", "world", "rust"]);
    }

    #[test]
    fn sentences_split() {
        let s = sentences("First one here. Second one there.");
        assert_eq!(s.len(), 2);
        assert_eq!(s[1], "Second one there.");
    }

    #[test]
    fn sentences_empty_text() {
        assert!(sentences("   ").is_empty());
    }

    #[test]
    fn tokenize_positions() {
        let stemmer = PhraseStemmer::new();
        let tokens = tokenize("Cats run. Dogs bark loudly.", &stemmer);
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].stem, "cat");
        assert_eq!(tokens[2].value, "Dogs");
        assert_eq!(tokens[2].text_position, 2);
        assert_eq!(tokens[2].sentence_position, 0);
        assert_eq!(tokens[2].sentence_number, 1);
        assert_eq!(tokens[4].sentence_position, 2);
    }

    #[test]
    fn concatenated_bigrams() {
        let w = words("los angeles lakers");
        assert_eq!(concatenated_grams(&w, 2), vec!["losangeles", "angeleslakers"]);
    }

    #[test]
    fn concatenated_grams_too_short() {
        let w = words("rust");
        assert!(concatenated_grams(&w, 2).is_empty());
    }

    #[test]
    fn term_count_of_collocation() {
        let t = Token {
            value: "machine learning".into(),
            stem: "machin learn".into(),
            text_position: 0,
            sentence_position: 0,
            sentence_number: 0,
        };
        assert_eq!(t.term_count(), 2);
    }
}
