//! Core pipeline for the RAGme knowledge-base service.
//!
//! Documents are split into overlapping text chunks, embedded into vectors,
//! and stored in a vector index; queries are embedded and answered by
//! cosine-similarity search over that index, with the ranked results
//! assembled into a single context block.
//!
//! The crate is organised around two narrow collaborator traits —
//! [`EmbeddingProvider`] and [`VectorIndex`] — composed by the
//! [`RagPipeline`] orchestrator. Backend integrations are feature-gated:
//!
//! - `openai` — [`openai::OpenAiEmbeddingProvider`], an OpenAI-compatible
//!   `/v1/embeddings` HTTP client.
//! - `qdrant` — [`qdrant::QdrantIndex`], a gRPC adapter for Qdrant.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragme_core::{HashEmbeddingProvider, InMemoryIndex, KbConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(KbConfig::default())
//!     .embedding_provider(Arc::new(HashEmbeddingProvider::new(384)))
//!     .index(Arc::new(InMemoryIndex::new()))
//!     .build()?;
//!
//! pipeline.ensure_ready().await?;
//! let outcome = pipeline.ingest("some document text", None).await?;
//! let answer = pipeline.query("a question", None).await?;
//! ```

pub mod chunking;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod error;
pub mod identity;
pub mod index;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{KbConfig, KbConfigBuilder};
pub use context::assemble_context;
pub use document::{
    IngestOutcome, Payload, QueryOutcome, RetrievedChunk, ScoredPoint, VectorPoint,
};
pub use embedding::{EmbeddingProvider, HashEmbeddingProvider};
pub use error::{KbError, Result};
pub use index::VectorIndex;
pub use inmemory::InMemoryIndex;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
