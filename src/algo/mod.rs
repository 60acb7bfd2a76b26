pub mod bag;
pub mod candidate;
pub mod classifier;
pub mod collocation;
pub mod corpus;
pub mod correlation;
pub mod dataset;
pub mod document;
pub mod evaluation;
pub mod extractor;
pub mod keyphrase;
pub mod model;
pub mod rerank;
pub mod sampling;
pub mod stem;
pub mod stopwords;
#[cfg(feature = "store")]
pub mod storage;
pub mod tagger;
pub mod tokenizer;

pub use extractor::{ExtractorSettings, KeyphraseExtractor};
pub use keyphrase::{Extractor, Keyphrase};
pub use tagger::{ControlledTagger, TaggerSettings};
