//! Controlled tagging: assign tags from a learned vocabulary to new texts.
//!
//! Training builds a tag vocabulary (raw and stemmed), a document frequency
//! index over vocabulary hits and optionally tag co-occurrences. Tagging
//! scores every vocabulary entry found in a text by TF-IDF, boosts popular
//! tags, re-ranks by co-occurrence with the other candidates, and maps the
//! stems back to their most common written form.

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, trace};

use super::bag::Bag;
use super::correlation::WordCorrelationMatrix;
use super::keyphrase::{Extractor, Keyphrase};
use super::rerank::{self, ReRankingMode, Weighted};
use super::stem::PhraseStemmer;
use super::stopwords::is_stopword;
use super::tokenizer;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaggingType {
    /// Assign every tag weighted at least `tfidf_threshold`.
    #[default]
    Threshold,
    /// Assign the `tag_count` best tags.
    FixedCount,
}

impl TaggingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::FixedCount => "fixed_count",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "threshold" => Some(Self::Threshold),
            "fixed_count" | "fixed" | "count" => Some(Self::FixedCount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerSettings {
    pub tagging_type: TaggingType,
    pub correlation: ReRankingMode,
    pub tfidf_threshold: f64,
    pub tag_count: usize,
    pub correlation_weight: f64,
    /// Weight of the popularity boost; negative disables it.
    pub prior_weight: f64,
    /// Longest word n-gram matched against the vocabulary ("los angeles" -> "losangeles").
    pub phrase_length: usize,
    /// Tags (and their stems) must match this pattern.
    pub tag_pattern: String,
    /// Prune weak candidates before correlation re-ranking.
    pub fast_mode: bool,
}

impl Default for TaggerSettings {
    fn default() -> Self {
        Self {
            tagging_type: TaggingType::Threshold,
            correlation: ReRankingMode::None,
            tfidf_threshold: 0.005,
            tag_count: 10,
            correlation_weight: 50.0,
            prior_weight: 1.0,
            phrase_length: 3,
            tag_pattern: r"^[a-z0-9][a-z0-9.+#\-]+$".into(),
            fast_mode: true,
        }
    }
}

/// Learned state of the tagger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TaggerIndex {
    /// stemmed tag -> number of indexed documents containing it
    idf: Bag,
    /// number of indexed documents
    idf_count: usize,
    tag_vocabulary: Bag,
    stemmed_vocabulary: Bag,
    /// stem -> most common written form, only where they differ
    unstem: HashMap<String, String>,
    train_count: usize,
    average_occurrence: f64,
    correlations: WordCorrelationMatrix,
    dirty: bool,
}

#[derive(Serialize)]
struct TaggerModelRef<'a> {
    settings: &'a TaggerSettings,
    index: &'a TaggerIndex,
}

#[derive(Deserialize)]
struct TaggerModel {
    settings: TaggerSettings,
    index: TaggerIndex,
}

/// Vocabulary and index statistics, sorted by count.
#[derive(Debug, Clone, Serialize)]
pub struct TaggerReport {
    pub train_count: usize,
    pub idf_count: usize,
    pub average_occurrence: f64,
    pub correlation_pairs: usize,
    /// "tag#count"
    pub vocabulary: Vec<String>,
    /// "stem#documents"
    pub idf: Vec<String>,
}

#[derive(Debug, Clone)]
struct ScoredTag {
    stem: String,
    weight: f64,
}

impl Weighted for ScoredTag {
    fn key(&self) -> &str {
        &self.stem
    }
    fn weight(&self) -> f64 {
        self.weight
    }
    fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }
}

#[derive(Debug, Clone)]
pub struct ControlledTagger {
    settings: TaggerSettings,
    index: TaggerIndex,
    pattern: Regex,
    stemmer: PhraseStemmer,
}

impl ControlledTagger {
    pub fn new(settings: TaggerSettings) -> Result<Self> {
        Self::from_parts(settings, TaggerIndex::default())
    }

    fn from_parts(settings: TaggerSettings, index: TaggerIndex) -> Result<Self> {
        let pattern = Regex::new(&settings.tag_pattern)?;
        Ok(Self {
            settings,
            index,
            pattern,
            stemmer: PhraseStemmer::new(),
        })
    }

    pub fn settings(&self) -> &TaggerSettings {
        &self.settings
    }

    /// Replace the settings, keeping the learned index.
    pub fn set_settings(&mut self, settings: TaggerSettings) -> Result<()> {
        self.pattern = Regex::new(&settings.tag_pattern)?;
        if settings.correlation != ReRankingMode::None {
            self.index.dirty = true;
        }
        self.settings = settings;
        Ok(())
    }

    // ── Training ────────────────────────────────────────────────────────

    /// Learn from a text and its tags. Either side may be empty: text only
    /// grows the IDF index, tags only grow the vocabulary and correlations.
    pub fn train(&mut self, text: &str, tags: &HashSet<String>) {
        let tags = self.clean(tags);
        let stems: Vec<String> = tags.iter().map(|t| self.stemmer.stem(t)).collect();

        for (tag, stem) in tags.iter().zip(&stems) {
            self.index.tag_vocabulary.add(tag);
            self.index.stemmed_vocabulary.add(stem);
        }

        if !text.trim().is_empty() {
            self.add_to_idf(text);
        }

        if self.settings.correlation != ReRankingMode::None {
            self.index.correlations.update_group(&stems);
        }

        if !tags.is_empty() {
            self.index.train_count += 1;
            self.index.dirty = true;
        }
    }

    pub fn train_text(&mut self, text: &str) {
        self.train(text, &HashSet::new());
    }

    pub fn train_tags(&mut self, tags: &HashSet<String>) {
        self.train("", tags);
    }

    /// Keep lowercase tags matching the tag pattern.
    fn clean(&self, tags: &HashSet<String>) -> Vec<String> {
        let mut cleaned: Vec<String> = tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| self.pattern.is_match(t))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        cleaned.sort();
        cleaned
    }

    fn add_to_idf(&mut self, text: &str) {
        let found = self.extract_candidates(text);
        self.index.idf_count += 1;
        for (stem, _) in found.iter() {
            self.index.idf.add(stem);
        }
    }

    /// Rebuild derived data (unstem map, average occurrence, relative
    /// correlations) after the vocabulary changed.
    pub fn update_index(&mut self) {
        if !self.index.dirty {
            return;
        }

        let mut best: HashMap<String, (String, usize)> = HashMap::new();
        for (tag, count) in self.index.tag_vocabulary.iter() {
            let stem = self.stemmer.stem(tag);
            let entry = best.entry(stem).or_insert_with(|| (tag.to_string(), 0));
            if count > entry.1 || (count == entry.1 && tag < entry.0.as_str()) {
                *entry = (tag.to_string(), count);
            }
        }
        self.index.unstem = best
            .into_iter()
            .filter(|(stem, (tag, _))| stem != tag)
            .map(|(stem, (tag, _))| (stem, tag))
            .collect();

        let vocabulary = &self.index.stemmed_vocabulary;
        self.index.average_occurrence = if vocabulary.unique_len() == 0 {
            0.0
        } else {
            vocabulary.total() as f64 / vocabulary.unique_len() as f64
        };

        if self.settings.correlation != ReRankingMode::None {
            self.index.correlations.make_relative_scores();
        }

        self.index.dirty = false;
        info!(
            tags = self.index.tag_vocabulary.unique_len(),
            stems = vocabulary.unique_len(),
            average_occurrence = self.index.average_occurrence,
            "updated tagger index"
        );
    }

    // ── Tagging ─────────────────────────────────────────────────────────

    /// Vocabulary stems found in the text (words and concatenated n-grams), with counts.
    fn extract_candidates(&self, text: &str) -> Bag {
        let words = tokenizer::words(text);
        let mut grams: Vec<String> = words.clone();
        for n in 2..=self.settings.phrase_length.min(words.len()) {
            grams.extend(tokenizer::concatenated_grams(&words, n));
        }

        let mut found = Bag::new();
        for gram in &grams {
            let stem = self.stemmer.stem(gram);
            if self.is_accepted(&stem) {
                found.add(&stem);
            }
        }
        found
    }

    fn is_accepted(&self, stem: &str) -> bool {
        self.index.stemmed_vocabulary.contains(stem)
            && !is_stopword(stem)
            && self.pattern.is_match(stem)
    }

    fn idf(&self, stem: &str) -> f64 {
        if self.index.idf_count == 0 {
            return 0.0;
        }
        let count = self.index.idf.count(stem) as f64;
        (self.index.idf_count as f64 / (count + 1.0)).log10()
    }

    /// Score, re-rank and limit stemmed tags for a text already in the index.
    fn assign(&self, text: &str) -> Vec<ScoredTag> {
        let found = self.extract_candidates(text);
        let total = found.total() as f64;

        let mut tags: Vec<ScoredTag> = found
            .iter()
            .map(|(stem, count)| ScoredTag {
                stem: stem.to_string(),
                weight: count as f64 / total * self.idf(stem),
            })
            .collect();
        rerank::sort_by_weight(&mut tags);
        trace!(candidates = tags.len(), "ranked tags");

        if tags.len() > 1 {
            self.rerank(&mut tags);
        }

        match self.settings.tagging_type {
            TaggingType::Threshold => rerank::limit_to_weight(&mut tags, self.settings.tfidf_threshold),
            TaggingType::FixedCount => rerank::limit_to_count(&mut tags, self.settings.tag_count),
        }
        tags
    }

    /// Prior boost and correlation re-ranking, keeping the original weight range.
    fn rerank(&self, tags: &mut Vec<ScoredTag>) {
        let old_max = tags[0].weight;
        let old_min = tags[tags.len() - 1].weight;

        if self.settings.prior_weight >= 0.0 && self.index.average_occurrence > 0.0 {
            for tag in tags.iter_mut() {
                let count = self.index.stemmed_vocabulary.count(&tag.stem) as f64;
                let boost = (1.0
                    + self.settings.prior_weight * count / self.index.average_occurrence)
                    .log10()
                    + 1.0;
                tag.weight *= boost;
            }
            rerank::sort_by_weight(tags);
        }

        if self.settings.correlation != ReRankingMode::None {
            if self.settings.fast_mode {
                match self.settings.tagging_type {
                    TaggingType::Threshold => {
                        rerank::limit_to_weight(tags, self.settings.tfidf_threshold * 0.0001)
                    }
                    TaggingType::FixedCount => {
                        rerank::limit_to_count(tags, self.settings.tag_count.saturating_mul(10))
                    }
                }
            }
            let wcm = &self.index.correlations;
            rerank::rerank(
                tags,
                self.settings.correlation,
                self.settings.correlation_weight,
                |a, b| wcm.relative(a, b),
            );
        }

        rerank::rescale(tags, old_min, old_max);
    }

    fn unstem_tag(&self, stem: &str) -> String {
        self.index
            .unstem
            .get(stem)
            .cloned()
            .unwrap_or_else(|| stem.to_string())
    }

    fn to_keyphrases(&self, tags: Vec<ScoredTag>) -> Vec<Keyphrase> {
        tags.into_iter()
            .map(|t| Keyphrase::new(self.unstem_tag(&t.stem), t.weight))
            .collect()
    }

    /// Tag one text. The text is added to the IDF index first.
    pub fn tag(&mut self, text: &str) -> Vec<Keyphrase> {
        self.add_to_idf(text);
        self.update_index();
        let tags = self.assign(text);
        debug!(assigned = tags.len(), "tagged text");
        self.to_keyphrases(tags)
    }

    /// Tag many texts. All texts enter the IDF index before any is tagged.
    pub fn tag_all(&mut self, texts: &[String]) -> Vec<Vec<Keyphrase>> {
        for text in texts {
            self.add_to_idf(text);
        }
        self.update_index();
        let this = &*self;
        texts
            .par_iter()
            .map(|text| this.to_keyphrases(this.assign(text)))
            .collect()
    }

    /// Map a tag to the form the tagger would assign it as.
    pub fn normalize_tag(&self, tag: &str) -> String {
        self.unstem_tag(&self.stemmer.stem(tag.trim()))
    }

    // ── Persistence and stats ───────────────────────────────────────────

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&TaggerModelRef {
            settings: &self.settings,
            index: &self.index,
        })?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let model: TaggerModel = serde_json::from_slice(bytes)?;
        let mut tagger = Self::from_parts(model.settings, model.index)?;
        tagger.update_index();
        Ok(tagger)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), "saved tagger model");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Model(format!("cannot read tagger model '{}': {e}", path.display())))?;
        let tagger = Self::from_json(&bytes)?;
        info!(
            path = %path.display(),
            tags = tagger.vocabulary_len(),
            "loaded tagger model"
        );
        Ok(tagger)
    }

    pub fn report(&self) -> TaggerReport {
        let format = |bag: &Bag| {
            bag.sorted_by_count()
                .into_iter()
                .map(|(k, v)| format!("{k}#{v}"))
                .collect()
        };
        TaggerReport {
            train_count: self.index.train_count,
            idf_count: self.index.idf_count,
            average_occurrence: self.index.average_occurrence,
            correlation_pairs: self.index.correlations.len(),
            vocabulary: format(&self.index.tag_vocabulary),
            idf: format(&self.index.idf),
        }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.index.tag_vocabulary.unique_len()
    }

    pub fn train_count(&self) -> usize {
        self.index.train_count
    }

    pub fn idf_count(&self) -> usize {
        self.index.idf_count
    }
}

impl Default for ControlledTagger {
    fn default() -> Self {
        Self {
            settings: TaggerSettings::default(),
            index: TaggerIndex::default(),
            pattern: Regex::new(&TaggerSettings::default().tag_pattern).expect("default tag pattern"),
            stemmer: PhraseStemmer::new(),
        }
    }
}

impl Extractor for ControlledTagger {
    fn name(&self) -> &'static str {
        "controlled_tagger"
    }

    fn needs_training(&self) -> bool {
        true
    }

    fn start_training(&mut self) {
        self.index = TaggerIndex::default();
    }

    fn train(&mut self, text: &str, keyphrases: &HashSet<String>) -> Result<()> {
        ControlledTagger::train(self, text, keyphrases);
        Ok(())
    }

    fn end_training(&mut self) -> Result<()> {
        self.update_index();
        Ok(())
    }

    fn extract(&mut self, text: &str) -> Result<Vec<Keyphrase>> {
        Ok(self.tag(text))
    }

    fn normalize(&self, phrase: &str) -> String {
        self.normalize_tag(phrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn trained(settings: TaggerSettings) -> ControlledTagger {
        let mut t = ControlledTagger::new(settings).unwrap();
        t.train("Rust is a systems programming language", &tags(&["rust", "programming"]));
        t.train("Python programming for data science", &tags(&["python", "programming", "datascience"]));
        t.train("Cooking pasta recipes at home", &tags(&["cooking", "recipes"]));
        t.train("Travel guide to Los Angeles", &tags(&["travel", "losangeles"]));
        t.train("Baking bread recipes", &tags(&["baking", "recipes"]));
        t.update_index();
        t
    }

    #[test]
    fn train_builds_vocabulary() {
        let t = trained(TaggerSettings::default());
        assert_eq!(t.train_count(), 5);
        assert_eq!(t.idf_count(), 5);
        assert!(t.vocabulary_len() >= 9);
    }

    #[test]
    fn invalid_tags_are_cleaned() {
        let mut t = ControlledTagger::default();
        t.train("", &tags(&["ok-tag", "Has Space", "x"]));
        assert_eq!(t.vocabulary_len(), 1);
        assert_eq!(t.train_count(), 1);
    }

    #[test]
    fn text_only_training_does_not_count() {
        let mut t = ControlledTagger::default();
        t.train_text("nothing to see");
        assert_eq!(t.train_count(), 0);
        assert_eq!(t.idf_count(), 1);
    }

    #[test]
    fn tags_only_vocabulary_text() {
        let mut t = ControlledTagger::default();
        t.train_tags(&tags(&["rust"]));
        t.train_text("a text about rust");
        t.train_text("a text about go");
        t.train_text("a text about java");
        t.train_text("a text about python");
        let result = t.tag("rust rust rust compiler");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].value, "rust");
    }

    #[test]
    fn tag_finds_vocabulary_terms() {
        let mut t = trained(TaggerSettings {
            tagging_type: TaggingType::FixedCount,
            tag_count: 5,
            ..Default::default()
        });
        let result = t.tag("Delicious pasta recipes for cooking at home. More recipes!");
        let values: Vec<&str> = result.iter().map(|k| k.value.as_str()).collect();
        assert!(values.contains(&"recipes"), "{values:?}");
        assert!(values.contains(&"cooking"), "{values:?}");
        assert!(!values.contains(&"rust"));
        for w in result.windows(2) {
            assert!(w[0].weight >= w[1].weight);
        }
    }

    #[test]
    fn concatenated_ngrams_match() {
        let mut t = trained(TaggerSettings {
            tagging_type: TaggingType::FixedCount,
            ..Default::default()
        });
        let result = t.tag("Weekend in Los Angeles");
        assert!(result.iter().any(|k| k.value == "losangeles"));
    }

    #[test]
    fn fixed_count_limits() {
        let mut t = trained(TaggerSettings {
            tagging_type: TaggingType::FixedCount,
            tag_count: 1,
            ..Default::default()
        });
        let result = t.tag("rust python cooking baking travel");
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn unstems_to_common_form() {
        let mut t = trained(TaggerSettings {
            tagging_type: TaggingType::FixedCount,
            ..Default::default()
        });
        // "programming" is stored as stem "program"
        let result = t.tag("programming a program");
        assert!(result.iter().any(|k| k.value == "programming"));
        assert_eq!(t.normalize_tag("Programming"), "programming");
    }

    #[test]
    fn deep_correlations_keep_range() {
        let settings = TaggerSettings {
            tagging_type: TaggingType::FixedCount,
            correlation: ReRankingMode::Deep,
            ..Default::default()
        };
        let mut plain = trained(TaggerSettings {
            correlation: ReRankingMode::None,
            ..settings.clone()
        });
        let mut correlated = trained(settings);
        let text = "python programming and rust with recipes";
        let a = plain.tag(text);
        let b = correlated.tag(text);
        assert_eq!(a.len(), b.len());
        let max = |v: &[Keyphrase]| v.iter().map(|k| k.weight).fold(f64::MIN, f64::max);
        assert!((max(&a) - max(&b)).abs() < 1e-9);
    }

    /// "alpha" and "beta" are always assigned together, "gamma" alone.
    fn correlated(settings: TaggerSettings) -> ControlledTagger {
        let mut t = ControlledTagger::new(TaggerSettings {
            prior_weight: -1.0,
            ..settings
        })
        .unwrap();
        for _ in 0..3 {
            t.train_tags(&tags(&["alpha", "beta"]));
        }
        t.train_tags(&tags(&["gamma"]));
        t
    }

    fn values(result: &[Keyphrase]) -> Vec<&str> {
        result.iter().map(|k| k.value.as_str()).collect()
    }

    #[test]
    fn shallow_correlation_lifts_partner_of_top_tag() {
        let settings = TaggerSettings {
            tagging_type: TaggingType::FixedCount,
            tag_count: 3,
            ..Default::default()
        };
        let text = "alpha alpha alpha gamma gamma beta";
        let mut fillers = Vec::new();
        for i in 0..10 {
            fillers.push(format!("filler text number {i}"));
        }

        let mut plain = correlated(settings.clone());
        let mut shallow = correlated(TaggerSettings {
            correlation: ReRankingMode::Shallow,
            ..settings
        });
        for f in &fillers {
            plain.train_text(f);
            shallow.train_text(f);
        }

        let a = plain.tag(text);
        assert_eq!(values(&a), vec!["alpha", "gamma", "beta"]);

        let b = shallow.tag(text);
        assert_eq!(values(&b), vec!["beta", "alpha", "gamma"]);
        // re-ranked weights stay within the original range
        assert!((a[0].weight - b[0].weight).abs() < 1e-9);
        assert!((a[2].weight - b[2].weight).abs() < 1e-9);
    }

    #[test]
    fn deep_correlation_lifts_correlated_pair() {
        let settings = TaggerSettings {
            tagging_type: TaggingType::FixedCount,
            tag_count: 3,
            correlation: ReRankingMode::Deep,
            ..Default::default()
        };
        let mut t = correlated(settings);
        for i in 0..10 {
            t.train_text(&format!("filler text number {i}"));
        }
        let result = t.tag("alpha alpha alpha gamma gamma beta");
        assert_eq!(values(&result), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn fast_mode_prunes_before_reranking() {
        let settings = TaggerSettings {
            tagging_type: TaggingType::Threshold,
            tfidf_threshold: 0.01,
            correlation: ReRankingMode::Shallow,
            ..Default::default()
        };
        let build = |fast_mode: bool| {
            let mut t = correlated(TaggerSettings {
                fast_mode,
                ..settings.clone()
            });
            // "beta" is in every document, so its weight drops below zero
            t.train_text("beta");
            t.train_text("beta");
            t
        };
        let text = "alpha alpha gamma beta";

        let fast = build(true).tag(text);
        assert!(values(&fast).contains(&"alpha"), "{fast:?}");
        assert!(!values(&fast).contains(&"beta"), "{fast:?}");

        let full = build(false).tag(text);
        assert_eq!(full[0].value, "beta", "{full:?}");
        for k in &full {
            assert!(k.weight >= 0.01);
        }
    }

    #[test]
    fn huge_settings_do_not_overflow() {
        let mut t = trained(TaggerSettings {
            tagging_type: TaggingType::FixedCount,
            tag_count: usize::MAX,
            correlation: ReRankingMode::Shallow,
            phrase_length: usize::MAX,
            ..Default::default()
        });
        let result = t.tag("Weekend in Los Angeles with rust programming");
        assert!(result.iter().any(|k| k.value == "losangeles"));
        assert!(result.iter().any(|k| k.value == "rust"));
    }

    #[test]
    fn tag_all_matches_count() {
        let mut t = trained(TaggerSettings::default());
        let texts = vec!["rust programming".to_string(), "baking recipes".to_string()];
        let result = t.tag_all(&texts);
        assert_eq!(result.len(), 2);
        assert_eq!(t.idf_count(), 7);
    }

    #[test]
    fn untrained_returns_nothing() {
        let mut t = ControlledTagger::default();
        assert!(t.tag("anything at all").is_empty());
    }

    #[test]
    fn invalid_pattern_is_error() {
        let settings = TaggerSettings {
            tag_pattern: "(".into(),
            ..Default::default()
        };
        assert!(matches!(ControlledTagger::new(settings), Err(Error::Pattern(_))));
    }

    #[test]
    fn save_load_roundtrip() {
        let t = trained(TaggerSettings::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagger.json");
        t.save(&path).unwrap();
        let loaded = ControlledTagger::load(&path).unwrap();
        assert_eq!(loaded.vocabulary_len(), t.vocabulary_len());
        assert_eq!(loaded.settings(), t.settings());
        assert_eq!(loaded.report().vocabulary, t.report().vocabulary);
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(matches!(
            ControlledTagger::load("/nonexistent/tagger.json"),
            Err(Error::Model(_))
        ));
    }

    #[test]
    fn report_sorted() {
        let t = trained(TaggerSettings::default());
        let report = t.report();
        assert!(report.vocabulary[0].starts_with("programming#2") || report.vocabulary[0].starts_with("recipes#2"));
        assert_eq!(report.train_count, 5);
    }
}
