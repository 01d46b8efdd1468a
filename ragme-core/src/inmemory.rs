//! In-memory vector index using cosine similarity.
//!
//! Suitable for development and tests; everything lives in `HashMap`s
//! behind a `tokio::sync::RwLock`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{ScoredPoint, VectorPoint};
use crate::error::{KbError, Result};
use crate::index::VectorIndex;

const BACKEND: &str = "in-memory";

#[derive(Debug, Default)]
struct Collection {
    dimension: usize,
    points: HashMap<u64, VectorPoint>,
}

/// An in-memory [`VectorIndex`] with cosine-similarity search.
///
/// Collections map a name to a dimension plus a point-id → point map, so
/// upserts overwrite by id. All operations are async-safe via
/// `tokio::sync::RwLock`; a single instance can be shared across concurrent
/// ingestion and query calls.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(collection: &str) -> KbError {
        KbError::Index {
            backend: BACKEND.to_string(),
            message: format!("collection '{collection}' does not exist"),
        }
    }
}

/// Cosine similarity of two vectors; 0.0 if either has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn ensure_collection(&self, name: &str, dimension: usize, recreate: bool) -> Result<()> {
        let mut collections = self.collections.write().await;
        if recreate {
            collections.insert(name.to_string(), Collection { dimension, ..Default::default() });
            return Ok(());
        }
        match collections.get(name) {
            Some(existing) if existing.dimension != dimension => Err(KbError::Index {
                backend: BACKEND.to_string(),
                message: format!(
                    "collection '{name}' exists with dimension {} (requested {dimension})",
                    existing.dimension
                ),
            }),
            Some(_) => Ok(()),
            None => {
                collections
                    .insert(name.to_string(), Collection { dimension, ..Default::default() });
                Ok(())
            }
        }
    }

    async fn upsert(&self, collection: &str, points: &[VectorPoint]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let target = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;
        for point in points {
            if point.vector.len() != target.dimension {
                return Err(KbError::Index {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "point {} has dimension {} (collection '{collection}' expects {})",
                        point.id,
                        point.vector.len(),
                        target.dimension
                    ),
                });
            }
            target.points.insert(point.id, point.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let collections = self.collections.read().await;
        let target = collections.get(collection).ok_or_else(|| Self::missing(collection))?;

        let mut scored: Vec<ScoredPoint> = target
            .points
            .values()
            .map(|point| ScoredPoint {
                payload: point.payload.clone(),
                score: cosine_similarity(&point.vector, vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }
}
