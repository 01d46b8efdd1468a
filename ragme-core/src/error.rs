//! Error types for the `ragme-core` crate.

use thiserror::Error;

/// Errors that can occur in knowledge-base operations.
///
/// The variants distinguish the conceptual failing stage: configuration
/// validation, the embedding provider, the vector index, the document
/// itself, or pipeline orchestration. Collection-already-exists is never
/// surfaced as an error; index adapters swallow it.
#[derive(Debug, Error)]
pub enum KbError {
    /// Invalid configuration, rejected before any work is attempted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The embedding provider was unreachable or returned an error.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector index backend failed a create, upsert, or search call.
    #[error("Vector index error ({backend}): {message}")]
    Index {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The input could not be interpreted as a text document.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// An error in pipeline orchestration, wrapping the failing stage.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for knowledge-base operations.
pub type Result<T> = std::result::Result<T, KbError>;
