//! Supervised keyphrase extraction.
//!
//! Candidates are the words and collocations of a text, consolidated by
//! canonical stem. Each candidate gets a feature vector (position, frequency,
//! IDF, keyphrase prior, correlations with the other candidates...) and a
//! bagged regression model trained on documents with manually assigned
//! keyphrases scores how likely it is to be a keyphrase.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use super::candidate::Candidate;
use super::classifier::{CandidateClassifier, ClassifierSettings};
use super::collocation::collocations;
use super::corpus::Corpus;
use super::document::DocumentModel;
use super::keyphrase::{Extractor, Keyphrase};
use super::rerank::{self, AssignmentMode, ReRankingMode, Weighted};
use super::stem::{canonical, PhraseStemmer};
use super::stopwords::is_stopword;
use super::tokenizer::{self, Token};
use crate::error::{Error, Result};

/// Correlation weight that suits deep re-ranking, where boosts are spread
/// over all candidate pairs.
pub const DEEP_CORRELATION_WEIGHT: f64 = 30000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    pub assignment_mode: AssignmentMode,
    pub reranking_mode: ReRankingMode,
    pub keyphrase_count: usize,
    pub threshold: f64,
    pub correlation_weight: f64,
    /// Only assign phrases that were assigned in training.
    pub controlled_mode: bool,
    pub min_phrase_length: usize,
    pub max_phrase_length: usize,
    pub min_occurrence_count: usize,
    /// Candidate values must match this pattern.
    pub pattern: String,
    /// Maximum number of candidates buffered for classifier training.
    pub train_limit: usize,
    pub classifier: ClassifierSettings,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            assignment_mode: AssignmentMode::Combined,
            reranking_mode: ReRankingMode::None,
            keyphrase_count: 10,
            threshold: 0.3,
            correlation_weight: DEEP_CORRELATION_WEIGHT,
            controlled_mode: false,
            min_phrase_length: 1,
            max_phrase_length: 5,
            min_occurrence_count: 1,
            pattern: r"^[a-zA-Z\s]{3,}$".into(),
            train_limit: 160_000,
            classifier: ClassifierSettings::default(),
        }
    }
}

#[derive(Serialize)]
struct ExtractorModelRef<'a> {
    settings: &'a ExtractorSettings,
    corpus: &'a Corpus,
    classifier: &'a CandidateClassifier,
}

#[derive(Deserialize)]
struct ExtractorModel {
    settings: ExtractorSettings,
    corpus: Corpus,
    classifier: CandidateClassifier,
}

impl Weighted for Candidate {
    fn key(&self) -> &str {
        &self.key
    }
    fn weight(&self) -> f64 {
        self.regression_value
    }
    fn set_weight(&mut self, weight: f64) {
        self.regression_value = weight;
    }
}

#[derive(Debug, Clone)]
pub struct KeyphraseExtractor {
    settings: ExtractorSettings,
    corpus: Corpus,
    classifier: CandidateClassifier,
    pattern: Regex,
    stemmer: PhraseStemmer,
    train_documents: Vec<DocumentModel>,
    train_instances: usize,
}

impl KeyphraseExtractor {
    pub fn new(settings: ExtractorSettings) -> Result<Self> {
        let classifier = CandidateClassifier::new(settings.classifier.clone());
        Self::from_parts(settings, Corpus::new(), classifier)
    }

    fn from_parts(
        settings: ExtractorSettings,
        corpus: Corpus,
        classifier: CandidateClassifier,
    ) -> Result<Self> {
        if settings.min_phrase_length == 0 || settings.max_phrase_length < settings.min_phrase_length
        {
            return Err(Error::Config(format!(
                "invalid phrase length range {}..={}",
                settings.min_phrase_length, settings.max_phrase_length
            )));
        }
        let pattern = Regex::new(&settings.pattern)?;
        Ok(Self {
            settings,
            corpus,
            classifier,
            pattern,
            stemmer: PhraseStemmer::new(),
            train_documents: Vec::new(),
            train_instances: 0,
        })
    }

    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    /// Replace the ranking and assignment settings of a trained model.
    /// Classifier settings only take effect on the next training run.
    pub fn set_settings(&mut self, settings: ExtractorSettings) -> Result<()> {
        let rebuilt = Self::from_parts(settings, Corpus::new(), CandidateClassifier::default())?;
        self.settings = rebuilt.settings;
        self.pattern = rebuilt.pattern;
        Ok(())
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn is_trained(&self) -> bool {
        self.classifier.is_trained()
    }

    /// Word tokens (if unigrams are wanted) followed by collocation tokens.
    fn tokens(&self, text: &str) -> Vec<Token> {
        let words = tokenizer::tokenize(text, &self.stemmer);
        let mut tokens = collocations(
            &words,
            self.settings.min_phrase_length,
            self.settings.max_phrase_length,
        );
        if self.settings.min_phrase_length == 1 {
            tokens.extend(words);
        }
        tokens
    }

    fn add_to_corpus(&mut self, tokens: &[Token]) {
        let keys: Vec<String> = tokens
            .iter()
            .map(|t| canonical(&t.stem))
            .collect();
        self.corpus.add_document(keys.iter().map(String::as_str));
    }

    /// Whether a candidate matches one of the manually assigned keyphrases,
    /// comparing stems and surface forms with and without spaces.
    fn is_positive(candidate: &Candidate, lowercase: &HashSet<String>, stemmed: &HashSet<String>) -> bool {
        let stem_joined = candidate.stem.replace(' ', "");
        let value_joined = candidate.value.replace(' ', "");
        [
            candidate.key.as_str(),
            candidate.stem.as_str(),
            stem_joined.as_str(),
            candidate.value.as_str(),
            value_joined.as_str(),
        ]
        .iter()
        .any(|form| stemmed.contains(*form) || lowercase.contains(*form))
    }

    /// Keep candidates that may be assigned.
    fn is_assignable(&self, candidate: &Candidate) -> bool {
        !is_stopword(&candidate.value)
            && self.pattern.is_match(&candidate.value)
            && !(self.settings.controlled_mode && candidate.features.prior == 0.0)
            && candidate.count() >= self.settings.min_occurrence_count
    }

    // ── Persistence ─────────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&ExtractorModelRef {
            settings: &self.settings,
            corpus: &self.corpus,
            classifier: &self.classifier,
        })?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let model: ExtractorModel = serde_json::from_slice(bytes)?;
        Self::from_parts(model.settings, model.corpus, model.classifier)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), "saved extractor model");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            Error::Model(format!("cannot read extractor model '{}': {e}", path.display()))
        })?;
        let extractor = Self::from_json(&bytes)?;
        info!(
            path = %path.display(),
            documents = extractor.corpus.num_docs(),
            "loaded extractor model"
        );
        Ok(extractor)
    }
}

impl Extractor for KeyphraseExtractor {
    fn name(&self) -> &'static str {
        "keyphrase_extractor"
    }

    fn needs_training(&self) -> bool {
        true
    }

    fn start_training(&mut self) {
        self.corpus.clear();
        self.classifier = CandidateClassifier::new(self.settings.classifier.clone());
        self.train_documents.clear();
        self.train_instances = 0;
    }

    fn train(&mut self, text: &str, keyphrases: &HashSet<String>) -> Result<()> {
        let tokens = self.tokens(text);
        self.add_to_corpus(&tokens);

        let lowercase: HashSet<String> = keyphrases
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        let stemmed = self.stemmer.stem_all(lowercase.iter().map(String::as_str));
        self.corpus.add_keyphrases(&stemmed);

        if self.train_instances >= self.settings.train_limit {
            return Ok(());
        }

        let mut document = DocumentModel::new(&tokens, &self.corpus);
        if self.settings.controlled_mode {
            document.remove_non_keyphrases();
        }
        for candidate in document.candidates_mut() {
            candidate.positive = Self::is_positive(candidate, &lowercase, &stemmed);
        }
        self.train_instances += document.len();
        self.train_documents.push(document);
        Ok(())
    }

    fn end_training(&mut self) -> Result<()> {
        self.corpus.make_relative_scores();

        let mut samples = Vec::with_capacity(self.train_instances);
        let mut labels = Vec::with_capacity(self.train_instances);
        for document in &mut self.train_documents {
            document.calculate_correlations(&self.corpus);
            for candidate in document.candidates() {
                samples.push(candidate.features.to_vec());
                labels.push(candidate.positive);
            }
        }

        let result = self.classifier.train(&samples, &labels);
        self.train_documents.clear();
        self.train_instances = 0;
        result?;

        info!(
            documents = self.corpus.num_docs(),
            keyphrase_documents = self.corpus.keyphrase_docs(),
            samples = samples.len(),
            "trained keyphrase extractor"
        );
        Ok(())
    }

    fn extract(&mut self, text: &str) -> Result<Vec<Keyphrase>> {
        if !self.classifier.is_trained() {
            return Err(Error::Model("extractor is not trained".into()));
        }

        let tokens = self.tokens(text);
        self.add_to_corpus(&tokens);

        let mut document = DocumentModel::new(&tokens, &self.corpus);
        if self.settings.controlled_mode {
            document.remove_non_keyphrases();
        }
        document.calculate_correlations(&self.corpus);

        let mut candidates: Vec<Candidate> = document
            .into_candidates()
            .into_iter()
            .filter(|c| self.is_assignable(c))
            .collect();
        for candidate in &mut candidates {
            candidate.regression_value = self.classifier.predict(&candidate.features.to_vec())?;
        }

        rerank::rerank(
            &mut candidates,
            self.settings.reranking_mode,
            self.settings.correlation_weight,
            |a, b| self.corpus.correlation(a, b),
        );
        rerank::limit(
            &mut candidates,
            self.settings.assignment_mode,
            self.settings.keyphrase_count,
            self.settings.threshold,
        );
        debug!(assigned = candidates.len(), "extracted keyphrases");

        Ok(candidates
            .into_iter()
            .map(|c| Keyphrase::new(c.value, c.regression_value))
            .collect())
    }

    fn normalize(&self, phrase: &str) -> String {
        self.stemmer.stem_phrase(&phrase.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn training_data() -> Vec<(String, HashSet<String>)> {
        let topics = [
            ("compiler", "The compiler checks borrowing rules. A compiler error explains the problem."),
            ("database", "The database stores rows on disk. Every database needs an index."),
            ("network", "The network carries packets between hosts. A slow network hurts latency."),
            ("garden", "The garden grows tomatoes in summer. Water the garden every morning."),
            ("telescope", "The telescope points at distant stars. A large telescope collects light."),
        ];
        let mut data = Vec::new();
        for round in 0..4 {
            for (keyphrase, text) in topics.iter() {
                data.push((
                    format!("{text} Round {round} of notes about things."),
                    phrases(&[keyphrase]),
                ));
            }
        }
        data
    }

    /// Each document also mentions the next topic once, so known
    /// keyphrases appear as negative candidates too.
    fn cross_topic_data() -> Vec<(String, HashSet<String>)> {
        let topics = ["compiler", "database", "network", "garden", "telescope"];
        training_data()
            .into_iter()
            .enumerate()
            .map(|(i, (text, keyphrases))| {
                let next = topics[(i + 1) % topics.len()];
                (format!("{text} It is unlike a {next}."), keyphrases)
            })
            .collect()
    }

    fn trained_on(settings: ExtractorSettings, data: Vec<(String, HashSet<String>)>) -> KeyphraseExtractor {
        let mut e = KeyphraseExtractor::new(settings).unwrap();
        e.start_training();
        for (text, keyphrases) in data {
            e.train(&text, &keyphrases).unwrap();
        }
        e.end_training().unwrap();
        e
    }

    fn trained(settings: ExtractorSettings) -> KeyphraseExtractor {
        trained_on(settings, training_data())
    }

    const TELESCOPE_TEXT: &str =
        "The telescope was moved. Our telescope now sees more stars than the old telescope.";

    fn all_candidates(reranking_mode: ReRankingMode) -> Vec<Keyphrase> {
        let mut e = trained(ExtractorSettings {
            assignment_mode: AssignmentMode::FixedCount,
            keyphrase_count: 1000,
            reranking_mode,
            ..Default::default()
        });
        e.extract(TELESCOPE_TEXT).unwrap()
    }

    #[test]
    fn extracts_repeated_topic_word() {
        let mut e = trained(ExtractorSettings {
            assignment_mode: AssignmentMode::FixedCount,
            keyphrase_count: 3,
            ..Default::default()
        });
        assert!(e.is_trained());
        let result = e
            .extract("The telescope was moved. Our telescope now sees more stars than the old telescope.")
            .unwrap();
        assert!(!result.is_empty());
        assert!(result.len() <= 3);
        assert_eq!(result[0].value, "telescope", "{result:?}");
        for w in result.windows(2) {
            assert!(w[0].weight >= w[1].weight);
        }
    }

    #[test]
    fn untrained_extract_errors() {
        let mut e = KeyphraseExtractor::new(ExtractorSettings::default()).unwrap();
        assert!(matches!(e.extract("some text"), Err(Error::Model(_))));
    }

    #[test]
    fn training_without_keyphrases_errors() {
        let mut e = KeyphraseExtractor::new(ExtractorSettings::default()).unwrap();
        e.start_training();
        e.train("Nothing assigned here at all.", &HashSet::new()).unwrap();
        assert!(matches!(e.end_training(), Err(Error::Training(_))));
    }

    #[test]
    fn controlled_mode_only_known_phrases() {
        let mut e = trained_on(
            ExtractorSettings {
                controlled_mode: true,
                assignment_mode: AssignmentMode::FixedCount,
                ..Default::default()
            },
            cross_topic_data(),
        );
        let result = e
            .extract("The garden and the database and the mysterious volcano volcano.")
            .unwrap();
        let known = ["compiler", "database", "network", "garden", "telescope"];
        assert!(result.iter().all(|k| known.contains(&k.value.as_str())), "{result:?}");
    }

    #[test]
    fn controlled_training_keeps_only_known_candidates() {
        let buffered = |controlled_mode: bool| {
            let mut e = KeyphraseExtractor::new(ExtractorSettings {
                controlled_mode,
                ..Default::default()
            })
            .unwrap();
            e.start_training();
            for (text, keyphrases) in cross_topic_data() {
                e.train(&text, &keyphrases).unwrap();
            }
            e
        };

        let controlled = buffered(true);
        let open = buffered(false);
        assert!(controlled.train_instances < open.train_instances);
        assert!(controlled
            .train_documents
            .iter()
            .flat_map(|d| d.candidates())
            .all(|c| c.features.prior > 0.0));
        assert!(controlled
            .train_documents
            .iter()
            .flat_map(|d| d.candidates())
            .any(|c| !c.positive));
    }

    #[test]
    fn reranking_keeps_candidates_and_range() {
        let plain = all_candidates(ReRankingMode::None);
        assert!(plain.len() > 3);
        let max = |v: &[Keyphrase]| v.iter().map(|k| k.weight).fold(f64::MIN, f64::max);
        let min = |v: &[Keyphrase]| v.iter().map(|k| k.weight).fold(f64::MAX, f64::min);

        for mode in [ReRankingMode::Shallow, ReRankingMode::Deep] {
            let reranked = all_candidates(mode);
            assert_eq!(reranked.len(), plain.len(), "{mode:?}");
            let mut a: Vec<&str> = plain.iter().map(|k| k.value.as_str()).collect();
            let mut b: Vec<&str> = reranked.iter().map(|k| k.value.as_str()).collect();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b, "{mode:?}");
            assert!((max(&plain) - max(&reranked)).abs() < 1e-9, "{mode:?}");
            assert!((min(&plain) - min(&reranked)).abs() < 1e-9, "{mode:?}");
            for w in reranked.windows(2) {
                assert!(w[0].weight >= w[1].weight);
            }
        }
    }

    #[test]
    fn threshold_mode_keeps_strictly_heavier() {
        let threshold = 0.5;
        let expected: Vec<String> = all_candidates(ReRankingMode::None)
            .into_iter()
            .filter(|k| k.weight > threshold)
            .map(|k| k.value)
            .collect();

        let mut e = trained(ExtractorSettings {
            assignment_mode: AssignmentMode::Threshold,
            threshold,
            ..Default::default()
        });
        let result = e.extract(TELESCOPE_TEXT).unwrap();
        let values: Vec<String> = result.iter().map(|k| k.value.clone()).collect();
        assert_eq!(values, expected);
        assert!(result.iter().all(|k| k.weight > threshold));
    }

    #[test]
    fn combined_mode_adds_heavy_tail() {
        let all = all_candidates(ReRankingMode::None);
        let threshold = all[1].weight - 1e-6;
        let mut expected = vec![all[0].value.clone()];
        expected.extend(all[1..].iter().filter(|k| k.weight > threshold).map(|k| k.value.clone()));
        assert!(expected.len() >= 2);

        let mut e = trained(ExtractorSettings {
            assignment_mode: AssignmentMode::Combined,
            keyphrase_count: 1,
            threshold,
            ..Default::default()
        });
        let values: Vec<String> = e
            .extract(TELESCOPE_TEXT)
            .unwrap()
            .into_iter()
            .map(|k| k.value)
            .collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn min_occurrence_filters() {
        let mut e = trained(ExtractorSettings {
            min_occurrence_count: 2,
            assignment_mode: AssignmentMode::FixedCount,
            ..Default::default()
        });
        let result = e.extract("The network is down. Restart the network router.").unwrap();
        assert!(result.iter().all(|k| k.value == "network"), "{result:?}");
    }

    #[test]
    fn invalid_length_range_rejected() {
        let settings = ExtractorSettings {
            min_phrase_length: 3,
            max_phrase_length: 2,
            ..Default::default()
        };
        assert!(matches!(KeyphraseExtractor::new(settings), Err(Error::Config(_))));
    }

    #[test]
    fn normalize_uses_canonical_stems() {
        let e = KeyphraseExtractor::new(ExtractorSettings::default()).unwrap();
        assert_eq!(e.normalize("Learning Machines"), e.normalize("machine learning"));
    }

    #[test]
    fn save_load_keeps_results() {
        let mut e = trained(ExtractorSettings::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extractor.json");
        e.save(&path).unwrap();
        let mut loaded = KeyphraseExtractor::load(&path).unwrap();
        assert_eq!(loaded.settings(), e.settings());
        let text = "The compiler rejects the program. Fix the compiler warning.";
        let a = e.extract(text).unwrap();
        let b = loaded.extract(text).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.value, y.value);
            assert!((x.weight - y.weight).abs() < 1e-9);
        }
    }
}
