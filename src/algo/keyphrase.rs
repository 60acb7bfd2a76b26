use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::Result;

/// A phrase assigned to a text, with its ranking weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyphrase {
    pub value: String,
    pub weight: f64,
}

impl Keyphrase {
    pub fn new(value: impl Into<String>, weight: f64) -> Self {
        Self {
            value: value.into(),
            weight,
        }
    }
}

/// Common interface of the controlled tagger and the keyphrase extractor,
/// used by training, evaluation and the interfaces.
pub trait Extractor {
    fn name(&self) -> &'static str;

    /// Whether `extract` is meaningful before any training.
    fn needs_training(&self) -> bool;

    /// Reset all learned state before a new training run.
    fn start_training(&mut self);

    /// Learn from one text with its manually assigned keyphrases.
    fn train(&mut self, text: &str, keyphrases: &HashSet<String>) -> Result<()>;

    /// Finish a training run (build indices, fit models).
    fn end_training(&mut self) -> Result<()>;

    /// Assign keyphrases to a text, best first.
    fn extract(&mut self, text: &str) -> Result<Vec<Keyphrase>>;

    /// Normalized form used to compare assigned and expected keyphrases.
    fn normalize(&self, phrase: &str) -> String;
}
