//! Configuration for the knowledge-base pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{KbError, Result};

/// Configuration parameters for the knowledge-base pipeline.
///
/// Construct via [`KbConfig::builder()`] or [`KbConfig::from_env()`]; both
/// validate that the chunking parameters cannot produce a degenerate loop
/// (`chunk_overlap >= chunk_size`) and that sizes are non-zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KbConfig {
    /// Vector database host.
    pub vector_db_host: String,
    /// Vector database gRPC port.
    pub vector_db_port: u16,
    /// Name of the collection holding document chunks.
    pub collection_name: String,
    /// Identifier of the embedding model served by the provider.
    pub embedding_model: String,
    /// Dimensionality of the embedding vectors.
    pub embedding_dimension: usize,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Default number of results returned by a query.
    pub top_k: usize,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            vector_db_host: "localhost".to_string(),
            vector_db_port: 6334,
            collection_name: "documents".to_string(),
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            embedding_dimension: 384,
            chunk_size: 512,
            chunk_overlap: 50,
            top_k: 5,
        }
    }
}

impl KbConfig {
    /// Create a new builder for constructing a [`KbConfig`].
    pub fn builder() -> KbConfigBuilder {
        KbConfigBuilder::default()
    }

    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognised variables: `VECTOR_DB_HOST`, `VECTOR_DB_PORT`,
    /// `COLLECTION_NAME`, `EMBEDDING_MODEL`, `EMBEDDING_DIMENSION`,
    /// `CHUNK_SIZE`, `CHUNK_OVERLAP`, `TOP_K`.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Config`] if a numeric variable fails to parse or
    /// the resulting combination is invalid.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            vector_db_host: env_string("VECTOR_DB_HOST", defaults.vector_db_host),
            vector_db_port: env_parse("VECTOR_DB_PORT", defaults.vector_db_port)?,
            collection_name: env_string("COLLECTION_NAME", defaults.collection_name),
            embedding_model: env_string("EMBEDDING_MODEL", defaults.embedding_model),
            embedding_dimension: env_parse("EMBEDDING_DIMENSION", defaults.embedding_dimension)?,
            chunk_size: env_parse("CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: env_parse("CHUNK_OVERLAP", defaults.chunk_overlap)?,
            top_k: env_parse("TOP_K", defaults.top_k)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// URL of the vector database's gRPC endpoint.
    pub fn vector_db_url(&self) -> String {
        format!("http://{}:{}", self.vector_db_host, self.vector_db_port)
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(KbError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(KbError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(KbError::Config("top_k must be greater than zero".to_string()));
        }
        if self.embedding_dimension == 0 {
            return Err(KbError::Config(
                "embedding_dimension must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_string(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| KbError::Config(format!("invalid value for {key}: {raw:?}"))),
        Err(_) => Ok(default),
    }
}

/// Builder for constructing a validated [`KbConfig`].
#[derive(Debug, Clone, Default)]
pub struct KbConfigBuilder {
    config: KbConfig,
}

impl KbConfigBuilder {
    /// Set the vector database host.
    pub fn vector_db_host(mut self, host: impl Into<String>) -> Self {
        self.config.vector_db_host = host.into();
        self
    }

    /// Set the vector database port.
    pub fn vector_db_port(mut self, port: u16) -> Self {
        self.config.vector_db_port = port;
        self
    }

    /// Set the collection name.
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.config.collection_name = name.into();
        self
    }

    /// Set the embedding model identifier.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the embedding dimensionality.
    pub fn embedding_dimension(mut self, dimension: usize) -> Self {
        self.config.embedding_dimension = dimension;
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the default number of query results.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Build the [`KbConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Config`] if `chunk_size == 0`,
    /// `chunk_overlap >= chunk_size`, `top_k == 0`, or
    /// `embedding_dimension == 0`.
    pub fn build(self) -> Result<KbConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
