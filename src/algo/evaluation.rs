//! Precision/recall evaluation of an extractor on a tagged test set.

use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use tracing::info;

use super::dataset::DatasetEntry;
use super::keyphrase::Extractor;
use crate::error::Result;

/// Scores for one test document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DocumentScore {
    pub precision: f64,
    pub recall: f64,
    pub assigned: usize,
    pub correct: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationResult {
    pub extractor: String,
    pub train_documents: usize,
    pub test_documents: usize,
    pub average_precision: f64,
    pub average_recall: f64,
    /// Harmonic mean of the average precision and average recall.
    pub f1: f64,
    pub average_assigned: f64,
    pub train_millis: u128,
    pub test_millis: u128,
}

/// Compare assigned with expected keyphrases, both already normalized.
///
/// Precision is 0 when nothing was assigned; recall is 0 when nothing was expected.
pub fn score(assigned: &HashSet<String>, expected: &HashSet<String>) -> DocumentScore {
    let correct = assigned.intersection(expected).count();
    let precision = if assigned.is_empty() {
        0.0
    } else {
        correct as f64 / assigned.len() as f64
    };
    let recall = if expected.is_empty() {
        0.0
    } else {
        correct as f64 / expected.len() as f64
    };
    DocumentScore {
        precision,
        recall,
        assigned: assigned.len(),
        correct,
    }
}

/// Train the extractor on `train` and measure it on `test`.
pub fn evaluate<E: Extractor + ?Sized>(
    extractor: &mut E,
    train: &[DatasetEntry],
    test: &[DatasetEntry],
) -> Result<EvaluationResult> {
    let started = Instant::now();
    extractor.start_training();
    for entry in train {
        extractor.train(&entry.text, &entry.tags)?;
    }
    extractor.end_training()?;
    let train_millis = started.elapsed().as_millis();

    let started = Instant::now();
    let mut scores = Vec::with_capacity(test.len());
    for entry in test {
        let assigned: HashSet<String> = extractor
            .extract(&entry.text)?
            .iter()
            .map(|k| extractor.normalize(&k.value))
            .collect();
        let expected: HashSet<String> = entry.tags.iter().map(|t| extractor.normalize(t)).collect();
        scores.push(score(&assigned, &expected));
    }
    let test_millis = started.elapsed().as_millis();

    let n = scores.len().max(1) as f64;
    let average_precision = scores.iter().map(|s| s.precision).sum::<f64>() / n;
    let average_recall = scores.iter().map(|s| s.recall).sum::<f64>() / n;
    let f1 = if average_precision + average_recall == 0.0 {
        0.0
    } else {
        2.0 * average_precision * average_recall / (average_precision + average_recall)
    };
    let average_assigned = scores.iter().map(|s| s.assigned as f64).sum::<f64>() / n;

    let result = EvaluationResult {
        extractor: extractor.name().to_string(),
        train_documents: train.len(),
        test_documents: test.len(),
        average_precision,
        average_recall,
        f1,
        average_assigned,
        train_millis,
        test_millis,
    };
    info!(
        extractor = %result.extractor,
        precision = result.average_precision,
        recall = result.average_recall,
        f1 = result.f1,
        "evaluation finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::dataset::parse_line;
    use crate::algo::tagger::{ControlledTagger, TaggerSettings, TaggingType};

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn score_partial_match() {
        let s = score(&set(&["a", "b", "c", "d"]), &set(&["a", "b"]));
        assert_eq!(s.precision, 0.5);
        assert_eq!(s.recall, 1.0);
        assert_eq!(s.correct, 2);
    }

    #[test]
    fn nothing_assigned_scores_zero() {
        let s = score(&HashSet::new(), &set(&["a"]));
        assert_eq!(s.precision, 0.0);
        assert_eq!(s.recall, 0.0);
        assert_eq!(s.assigned, 0);
    }

    #[test]
    fn evaluates_tagger() {
        let lines = [
            "Rust programming with cargo#rust#programming",
            "Python programming for science#python#programming",
            "Cooking recipes for pasta#cooking#recipes",
            "Baking bread recipes at home#baking#recipes",
            "Travel tips for the summer#travel",
            "Programming in rust is fun#rust#programming",
        ];
        let entries: Vec<DatasetEntry> = lines.iter().filter_map(|l| parse_line(l)).collect();
        let (train, test) = entries.split_at(4);

        let mut tagger = ControlledTagger::new(TaggerSettings {
            tagging_type: TaggingType::FixedCount,
            tag_count: 2,
            ..Default::default()
        })
        .unwrap();
        let result = evaluate(&mut tagger, train, test).unwrap();
        assert_eq!(result.extractor, "controlled_tagger");
        assert_eq!(result.train_documents, 4);
        assert_eq!(result.test_documents, 2);
        assert!(result.average_precision >= 0.0 && result.average_precision <= 1.0);
        assert!(result.average_assigned <= 2.0);
        // the last document shares both tags with the training set
        assert!(result.average_recall > 0.0);
    }
}
