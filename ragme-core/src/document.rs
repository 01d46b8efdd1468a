//! Data types for ingestion outcomes, index points, and query results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arbitrary JSON payload attached to a point in the vector index.
pub type Payload = serde_json::Map<String, Value>;

/// Payload keys owned by the pipeline. Caller-supplied metadata can never
/// overwrite these.
pub const RESERVED_KEYS: [&str; 3] = ["document_id", "chunk_index", "text"];

/// The persisted unit in the vector index: a numeric id, an embedding, and
/// the chunk payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorPoint {
    /// Numeric point id, derived deterministically from the chunk id.
    pub id: u64,
    /// The chunk's embedding vector.
    pub vector: Vec<f32>,
    /// Payload: `document_id`, `chunk_index`, `text`, plus caller metadata.
    pub payload: Payload,
}

/// A single search hit: the stored payload plus its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    /// The stored payload of the matching point.
    pub payload: Payload,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}

/// Result of a successful ingestion call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestOutcome {
    /// The id assigned to the ingested document.
    pub document_id: String,
    /// How many chunks were created and stored.
    pub chunks_created: usize,
}

/// Result of a query: the ranked hits plus the assembled context block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// The original query text.
    pub query: String,
    /// Hits ordered by descending similarity score.
    pub results: Vec<ScoredPoint>,
    /// The assembled context block (see [`crate::assemble_context`]).
    pub context: String,
    /// Number of hits returned.
    pub num_results: usize,
}

/// A search hit re-projected for API consumers: reserved payload keys are
/// lifted to top-level fields, everything else is folded into `metadata`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The chunk text.
    pub text: String,
    /// Cosine similarity to the query.
    pub score: f32,
    /// Id of the document this chunk belongs to, if present in the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Position of this chunk within its document, if present in the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u64>,
    /// All non-reserved payload entries.
    pub metadata: Payload,
}

impl RetrievedChunk {
    /// Project a raw [`ScoredPoint`] into the API result shape.
    pub fn from_scored(point: &ScoredPoint) -> Self {
        let payload = &point.payload;
        let text = payload
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let document_id =
            payload.get("document_id").and_then(Value::as_str).map(str::to_string);
        let chunk_index = payload.get("chunk_index").and_then(Value::as_u64);
        let metadata: Payload = payload
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self { text, score: point.score, document_id, chunk_index, metadata }
    }
}

/// Build the payload for one chunk.
///
/// Caller metadata is merged first, then the reserved keys are inserted, so
/// `document_id`, `chunk_index`, and `text` always reflect pipeline-derived
/// values even if the caller supplied entries under those names.
pub fn chunk_payload(
    document_id: &str,
    chunk_index: usize,
    text: &str,
    metadata: Option<&Payload>,
) -> Payload {
    let mut payload = metadata.cloned().unwrap_or_default();
    payload.insert("document_id".to_string(), Value::String(document_id.to_string()));
    payload.insert("chunk_index".to_string(), Value::from(chunk_index as u64));
    payload.insert("text".to_string(), Value::String(text.to_string()));
    payload
}
