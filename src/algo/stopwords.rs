/// Check a lowercase word against the built-in English stopword list.
pub fn is_stopword(word: &str) -> bool {
    matches!(
        word,
        "a" | "about" | "above" | "after" | "again" | "against" | "all" | "almost" | "alone"
        | "along" | "already" | "also" | "although" | "always" | "am" | "among" | "an"
        | "and" | "another" | "any" | "anyone" | "anything" | "anywhere" | "are" | "around"
        | "as" | "at" | "back" | "be" | "became" | "because" | "become" | "becomes" | "been"
        | "before" | "being" | "below" | "between" | "both" | "but" | "by" | "can"
        | "cannot" | "could" | "did" | "do" | "does" | "doing" | "done" | "down" | "during"
        | "each" | "either" | "else" | "enough" | "etc" | "even" | "ever" | "every"
        | "few" | "for" | "from" | "further" | "had" | "has" | "have" | "having" | "he"
        | "her" | "here" | "hers" | "herself" | "him" | "himself" | "his" | "how"
        | "however" | "i" | "if" | "in" | "into" | "is" | "it" | "its" | "itself" | "just"
        | "least" | "less" | "like" | "many" | "may" | "me" | "might" | "more" | "most"
        | "much" | "must" | "my" | "myself" | "neither" | "never" | "no" | "nor" | "not"
        | "now" | "of" | "off" | "often" | "on" | "once" | "one" | "only" | "or" | "other"
        | "others" | "our" | "ours" | "ourselves" | "out" | "over" | "own" | "per"
        | "perhaps" | "rather" | "same" | "she" | "should" | "since" | "so" | "some"
        | "still" | "such" | "than" | "that" | "the" | "their" | "theirs" | "them"
        | "themselves" | "then" | "there" | "therefore" | "these" | "they" | "this"
        | "those" | "though" | "through" | "thus" | "to" | "together" | "too" | "toward"
        | "under" | "until" | "up" | "upon" | "us" | "very" | "via" | "was" | "we" | "well"
        | "were" | "what" | "whatever" | "when" | "where" | "whether" | "which" | "while"
        | "who" | "whom" | "whose" | "why" | "will" | "with" | "within" | "without"
        | "would" | "yet" | "you" | "your" | "yours" | "yourself" | "yourselves"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_words_are_stopwords() {
        for w in ["the", "and", "of", "which", "yourselves"] {
            assert!(is_stopword(w), "{w} should be a stopword");
        }
    }

    #[test]
    fn content_words_are_not() {
        for w in ["rust", "angeles", "compiler", "tagging"] {
            assert!(!is_stopword(w));
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(!is_stopword("The"));
    }
}
