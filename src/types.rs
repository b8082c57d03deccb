//! Crate-wide error taxonomy.

use thiserror::Error;

/// Errors surfaced by chunking, pipeline orchestration, and retrieval.
///
/// Collaborator implementations (extraction, embedding, search, completion)
/// map their transport-level failures into the matching variant; orchestrators
/// propagate with `?` and only the outermost boundary converts these into
/// user-facing messages.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid configuration detected before any processing began.
    #[error("configuration error: {0}")]
    Config(String),

    /// Document extraction collaborator failed.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Embedding collaborator failed or returned a mismatched batch.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Search index collaborator failed.
    #[error("search failed: {0}")]
    Search(String),

    /// Chat completion collaborator failed.
    #[error("completion failed: {0}")]
    Completion(String),

    /// Underlying storage failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem or other I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
