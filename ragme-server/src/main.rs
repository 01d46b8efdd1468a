use std::sync::Arc;

use anyhow::Context;
use ragme_core::openai::OpenAiEmbeddingProvider;
use ragme_core::qdrant::QdrantIndex;
use ragme_core::{
    EmbeddingProvider, HashEmbeddingProvider, InMemoryIndex, KbConfig, RagPipeline, VectorIndex,
};
use ragme_server::server::{AppState, ServerConfig, run_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = KbConfig::from_env().context("invalid knowledge-base configuration")?;

    let embedding_provider = build_embedding_provider(&config)?;
    let index = build_index(&config)?;

    let pipeline = Arc::new(
        RagPipeline::builder()
            .config(config)
            .embedding_provider(embedding_provider)
            .index(index)
            .build()
            .context("failed to build pipeline")?,
    );

    // Collection creation happens here, once, before any traffic.
    pipeline.ensure_ready().await.context("vector index is not ready")?;
    info!(collection = %pipeline.config().collection_name, "knowledge base ready");

    let server_config = ServerConfig {
        host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
        port: std::env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8000),
    };

    run_server(server_config, AppState { pipeline }).await
}

/// Select the embedding provider from `EMBEDDING_PROVIDER`.
///
/// `openai` (default) talks to an OpenAI-compatible `/v1/embeddings`
/// endpoint; `hash` is the deterministic offline provider for local
/// development without any model server.
fn build_embedding_provider(config: &KbConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let kind = std::env::var("EMBEDDING_PROVIDER").unwrap_or_else(|_| "openai".to_string());
    match kind.as_str() {
        "hash" => {
            info!(dimensions = config.embedding_dimension, "using hash embedding provider");
            Ok(Arc::new(HashEmbeddingProvider::new(config.embedding_dimension)))
        }
        "openai" => {
            let mut provider = OpenAiEmbeddingProvider::new(
                &config.embedding_model,
                config.embedding_dimension,
            );
            if let Ok(base_url) = std::env::var("EMBEDDING_BASE_URL") {
                provider = provider.with_base_url(base_url);
            }
            if let Ok(api_key) = std::env::var("EMBEDDING_API_KEY") {
                provider = provider.with_api_key(api_key);
            }
            info!(model = %config.embedding_model, "using OpenAI-compatible embedding provider");
            Ok(Arc::new(provider))
        }
        other => anyhow::bail!("unknown EMBEDDING_PROVIDER: {other:?}"),
    }
}

/// Select the vector index from `VECTOR_INDEX`.
///
/// `qdrant` (default) connects to the configured Qdrant endpoint; `memory`
/// keeps everything in process for local development.
fn build_index(config: &KbConfig) -> anyhow::Result<Arc<dyn VectorIndex>> {
    let kind = std::env::var("VECTOR_INDEX").unwrap_or_else(|_| "qdrant".to_string());
    match kind.as_str() {
        "memory" => {
            info!("using in-memory vector index");
            Ok(Arc::new(InMemoryIndex::new()))
        }
        "qdrant" => {
            let url = config.vector_db_url();
            info!(%url, "connecting to qdrant");
            Ok(Arc::new(QdrantIndex::connect(&url).context("failed to build qdrant client")?))
        }
        other => anyhow::bail!("unknown VECTOR_INDEX: {other:?}"),
    }
}
