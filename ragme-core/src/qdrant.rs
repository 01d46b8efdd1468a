//! Qdrant vector index backend.
//!
//! Provides [`QdrantIndex`], a [`VectorIndex`] implementation over the
//! [qdrant-client](https://docs.rs/qdrant-client) gRPC API. Only available
//! with the `qdrant` feature.

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, Struct,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload as QdrantPayload, Qdrant};
use tracing::debug;

use crate::document::{Payload, ScoredPoint, VectorPoint};
use crate::error::{KbError, Result};
use crate::index::VectorIndex;

const BACKEND: &str = "qdrant";

/// A [`VectorIndex`] backed by [Qdrant](https://qdrant.tech/).
///
/// Collections are created with cosine distance; points use the pipeline's
/// numeric ids and carry the chunk payload as a Qdrant JSON payload. A
/// single client is safely shared across concurrent calls.
pub struct QdrantIndex {
    client: Qdrant,
}

impl QdrantIndex {
    /// Connect to a Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub fn connect(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> KbError {
        KbError::Index { backend: BACKEND.to_string(), message: e.to_string() }
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        Ok(collections.collections.iter().any(|c| c.name == name))
    }
}

/// Convert a Qdrant payload value back into plain JSON.
fn qdrant_value_to_json(value: QdrantValue) -> serde_json::Value {
    match value.kind {
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(d)) => {
            serde_json::Number::from_f64(d).map(serde_json::Value::Number).unwrap_or_default()
        }
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(qdrant_value_to_json).collect())
        }
        Some(Kind::StructValue(Struct { fields })) => serde_json::Value::Object(
            fields.into_iter().map(|(k, v)| (k, qdrant_value_to_json(v))).collect(),
        ),
        Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self, name: &str, dimension: usize, recreate: bool) -> Result<()> {
        if recreate {
            // Best effort: a missing collection is fine.
            let _ = self.client.delete_collection(name).await;
        } else if self.collection_exists(name).await? {
            debug!(collection = name, "qdrant collection already exists, skipping creation");
            return Ok(());
        }

        let created = self
            .client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Cosine)),
            )
            .await;

        match created {
            Ok(_) => {
                debug!(collection = name, dimension, "created qdrant collection");
                Ok(())
            }
            // A concurrent creator may have won the race; already-exists is
            // not an error.
            Err(e) => {
                if self.collection_exists(name).await.unwrap_or(false) {
                    debug!(collection = name, "qdrant collection created concurrently");
                    Ok(())
                } else {
                    Err(Self::map_err(e))
                }
            }
        }
    }

    async fn upsert(&self, collection: &str, points: &[VectorPoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let qdrant_points: Vec<PointStruct> = points
            .iter()
            .map(|point| {
                let payload = QdrantPayload::try_from(serde_json::Value::Object(
                    point.payload.clone(),
                ))
                .map_err(|e| KbError::Index {
                    backend: BACKEND.to_string(),
                    message: format!("payload for point {} is not a valid payload: {e}", point.id),
                })?;
                Ok(PointStruct::new(point.id, point.vector.clone(), payload))
            })
            .collect::<Result<_>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, qdrant_points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count = points.len(), "upserted points to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, vector.to_vec(), limit as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let results = response
            .result
            .into_iter()
            .map(|scored| {
                let payload: Payload = scored
                    .payload
                    .into_iter()
                    .map(|(key, value)| (key, qdrant_value_to_json(value)))
                    .collect();
                ScoredPoint { payload, score: scored.score }
            })
            .collect();

        Ok(results)
    }
}
