//! Axum router and request handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use ragme_core::{KbError, Payload, QueryOutcome, RagPipeline, RetrievedChunk};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

const SERVICE_NAME: &str = "ragme-server";

/// Shared handler state: the one pipeline instance composed at startup.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RagPipeline>,
}

/// Listen address for the HTTP server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8000 }
    }
}

/// Build the service router.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/ingest/file", post(ingest_file))
        .route("/query", post(query))
        .route("/search", get(search))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped.
pub async fn run_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = app_router(state);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for ragme-server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("ragme-server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Request / response bodies ──────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub content: String,
    #[serde(default)]
    pub metadata: Option<Payload>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
    pub document_id: String,
    pub chunks_created: usize,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub results: Vec<RetrievedChunk>,
    pub context: String,
    pub num_results: usize,
}

impl QueryResponse {
    fn from_outcome(outcome: QueryOutcome) -> Self {
        let results = outcome.results.iter().map(RetrievedChunk::from_scored).collect();
        Self {
            query: outcome.query,
            results,
            context: outcome.context,
            num_results: outcome.num_results,
        }
    }
}

// ── Error mapping ──────────────────────────────────────────────────

/// Wraps [`KbError`] so handlers can use `?`.
///
/// Configuration and invalid-document errors are the caller's fault (400);
/// everything else is a server-side failure (500).
pub struct ApiError(KbError);

impl From<KbError> for ApiError {
    fn from(err: KbError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            KbError::Config(_) | KbError::InvalidDocument(_) => StatusCode::BAD_REQUEST,
            KbError::Embedding { .. } | KbError::Index { .. } | KbError::Pipeline(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

// ── Handlers ───────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

async fn ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    let outcome = state.pipeline.ingest(&request.content, request.metadata.as_ref()).await?;
    Ok(Json(IngestResponse {
        status: "success".to_string(),
        document_id: outcome.document_id,
        chunks_created: outcome.chunks_created,
    }))
}

async fn ingest_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| KbError::InvalidDocument(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| KbError::InvalidDocument(format!("failed to read upload: {e}")))?;
        let content = String::from_utf8(bytes.to_vec())
            .map_err(|_| KbError::InvalidDocument("file must be valid UTF-8 text".to_string()))?;

        let mut metadata = Payload::new();
        if let Some(filename) = filename {
            metadata.insert("filename".to_string(), json!(filename));
        }
        if let Some(content_type) = content_type {
            metadata.insert("content_type".to_string(), json!(content_type));
        }

        let outcome = state.pipeline.ingest(&content, Some(&metadata)).await?;
        return Ok(Json(IngestResponse {
            status: "success".to_string(),
            document_id: outcome.document_id,
            chunks_created: outcome.chunks_created,
        }));
    }

    Err(KbError::InvalidDocument("multipart body has no 'file' field".to_string()).into())
}

async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let outcome = state.pipeline.query(&request.query, request.limit).await?;
    Ok(Json(QueryResponse::from_outcome(outcome)))
}

/// `GET /search?q=&limit=` — alias for `POST /query`.
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<QueryResponse>, ApiError> {
    let outcome = state.pipeline.query(&params.q, params.limit).await?;
    Ok(Json(QueryResponse::from_outcome(outcome)))
}
