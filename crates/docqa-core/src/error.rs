use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to load document {}: {reason}", path.display())]
    DocumentLoad { path: PathBuf, reason: String },

    #[error("Failed to build vector index: {0}")]
    IndexBuild(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Generation failed: {0}")]
    Generation(String),
}

impl Error {
    pub fn document_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DocumentLoad { path: path.into(), reason: reason.to_string() }
    }

    /// True for the errors that abort engine initialization.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::DocumentLoad { .. } | Self::IndexBuild(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
