//! Knowledge-base pipeline orchestrator.
//!
//! [`RagPipeline`] composes an [`EmbeddingProvider`] and a [`VectorIndex`]
//! and drives the two workflows of the service:
//!
//! - ingestion: derive document id → chunk → batch-embed → batched upsert
//! - retrieval: embed query → similarity search → assemble context
//!
//! The pipeline is stateless apart from the shared index handle; one
//! instance is constructed at startup and shared by reference across
//! concurrent requests. Readiness (collection creation) is an explicit call,
//! not a first-use side effect.

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::KbConfig;
use crate::context::assemble_context;
use crate::document::{chunk_payload, IngestOutcome, Payload, QueryOutcome, VectorPoint};
use crate::embedding::EmbeddingProvider;
use crate::error::{KbError, Result};
use crate::identity::{chunk_id, document_id, point_id};
use crate::index::VectorIndex;

/// The knowledge-base pipeline.
///
/// Construct via [`RagPipeline::builder()`], then call
/// [`ensure_ready`](RagPipeline::ensure_ready) once before serving traffic.
pub struct RagPipeline {
    config: KbConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunker: FixedSizeChunker,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("config", &self.config)
            .field("chunker", &self.chunker)
            .finish_non_exhaustive()
    }
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &KbConfig {
        &self.config
    }

    /// Ensure the configured collection exists in the index.
    ///
    /// Idempotent; call once at startup before handling requests.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Pipeline`] if the index rejects the collection
    /// (already-exists is not a rejection).
    pub async fn ensure_ready(&self) -> Result<()> {
        let collection = &self.config.collection_name;
        let dimension = self.embedding_provider.dimensions();
        self.index.ensure_collection(collection, dimension, false).await.map_err(|e| {
            error!(collection, error = %e, "failed to ensure collection");
            KbError::Pipeline(format!("failed to ensure collection '{collection}': {e}"))
        })
    }

    /// Ingest a document: derive id → chunk → embed → upsert.
    ///
    /// All chunks are embedded in one batch call and written to the index in
    /// one upsert. Empty content yields zero chunks and touches neither
    /// collaborator. Caller metadata is merged into every chunk payload, but
    /// the reserved keys (`document_id`, `chunk_index`, `text`) always hold
    /// pipeline-derived values.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Pipeline`] if embedding or the index write fails.
    /// Partial writes are not rolled back; the per-call document id makes a
    /// retry safe.
    pub async fn ingest(
        &self,
        content: &str,
        metadata: Option<&Payload>,
    ) -> Result<IngestOutcome> {
        let doc_id = document_id(content);
        let chunks = self.chunker.chunk(content);
        if chunks.is_empty() {
            info!(document_id = %doc_id, chunks_created = 0, "ingested empty document");
            return Ok(IngestOutcome { document_id: doc_id, chunks_created: 0 });
        }

        let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(document_id = %doc_id, error = %e, "embedding failed during ingestion");
            KbError::Pipeline(format!("embedding failed for document '{doc_id}': {e}"))
        })?;

        let points: Vec<VectorPoint> = chunks
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (text, vector))| VectorPoint {
                id: point_id(&chunk_id(&doc_id, index)),
                vector,
                payload: chunk_payload(&doc_id, index, text, metadata),
            })
            .collect();

        let collection = &self.config.collection_name;
        self.index.upsert(collection, &points).await.map_err(|e| {
            error!(document_id = %doc_id, error = %e, "upsert failed during ingestion");
            KbError::Pipeline(format!("upsert failed for document '{doc_id}': {e}"))
        })?;

        let chunks_created = points.len();
        info!(document_id = %doc_id, chunks_created, "ingested document");
        Ok(IngestOutcome { document_id: doc_id, chunks_created })
    }

    /// Query the knowledge base: embed → search → assemble context.
    ///
    /// `limit` defaults to the configured `top_k`. A query that matches
    /// nothing returns empty results and an empty context, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Config`] for a zero `limit`, or
    /// [`KbError::Pipeline`] if embedding or the search fails.
    pub async fn query(&self, text: &str, limit: Option<usize>) -> Result<QueryOutcome> {
        let limit = match limit {
            Some(0) => {
                return Err(KbError::Config("limit must be greater than zero".to_string()));
            }
            Some(n) => n,
            None => self.config.top_k,
        };

        let query_vector = self.embedding_provider.embed(text).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            KbError::Pipeline(format!("query embedding failed: {e}"))
        })?;

        let collection = &self.config.collection_name;
        let results = self.index.search(collection, &query_vector, limit).await.map_err(|e| {
            error!(collection, error = %e, "vector index search failed");
            KbError::Pipeline(format!("search failed in collection '{collection}': {e}"))
        })?;

        let context = assemble_context(&results);
        let num_results = results.len();
        info!(num_results, "query completed");

        Ok(QueryOutcome { query: text.to_string(), results, context, num_results })
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields are required. [`build()`](RagPipelineBuilder::build) validates
/// the configuration and checks that the configured embedding dimension
/// matches what the provider actually produces.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<KbConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: KbConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector index backend.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Build the [`RagPipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Config`] if a required field is missing, the
    /// chunking parameters are invalid, or the provider's dimensionality
    /// disagrees with `embedding_dimension` in the configuration.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| KbError::Config("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| KbError::Config("embedding_provider is required".to_string()))?;
        let index = self.index.ok_or_else(|| KbError::Config("index is required".to_string()))?;

        let provider_dim = embedding_provider.dimensions();
        if provider_dim != config.embedding_dimension {
            return Err(KbError::Config(format!(
                "embedding provider produces {provider_dim}-dimensional vectors but \
                 embedding_dimension is {}",
                config.embedding_dimension
            )));
        }

        let chunker = FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?;

        Ok(RagPipeline { config, embedding_provider, index, chunker })
    }
}
