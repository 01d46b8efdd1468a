//! Vector index trait: the narrow capability the pipeline requires from its
//! storage collaborator.

use async_trait::async_trait;

use crate::document::{ScoredPoint, VectorPoint};
use crate::error::Result;

/// A named-collection vector index supporting upsert and k-nearest-neighbour
/// search by cosine similarity.
///
/// This is deliberately narrow: the pipeline needs nothing beyond idempotent
/// collection creation, batched overwrite-by-id upsert, and ranked search.
/// Filtering, per-point deletion, and transactions are out of scope.
///
/// # Example
///
/// ```rust,ignore
/// use ragme_core::{InMemoryIndex, VectorIndex};
///
/// let index = InMemoryIndex::new();
/// index.ensure_collection("documents", 384, false).await?;
/// index.upsert("documents", &points).await?;
/// let hits = index.search("documents", &query_vector, 5).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Ensure a collection exists with the given dimension and cosine
    /// distance.
    ///
    /// Idempotent: creating an existing collection is a no-op, including
    /// when a concurrent caller won the creation race. Existing data is
    /// destroyed only when `recreate` is true.
    async fn ensure_collection(&self, name: &str, dimension: usize, recreate: bool) -> Result<()>;

    /// Upsert points into a collection with overwrite-by-id semantics, as a
    /// single batched call.
    async fn upsert(&self, collection: &str, points: &[VectorPoint]) -> Result<()>;

    /// Return up to `limit` nearest neighbours of `vector` by cosine
    /// similarity, ordered by descending score.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>>;
}
