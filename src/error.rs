//! Error types shared by the engine and every interface.

use thiserror::Error;

/// Main error type for keyphrase operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid candidate or tag pattern
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Model could not be used (untrained, wrong kind, corrupt)
    #[error("model error: {0}")]
    Model(String),

    /// Training could not be completed
    #[error("training error: {0}")]
    Training(String),

    /// Malformed dataset
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Model store operation failed
    #[cfg(feature = "store")]
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
