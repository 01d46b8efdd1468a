//! Property tests for in-memory index search ordering.

use std::collections::HashMap;

use proptest::prelude::*;
use ragme_core::{InMemoryIndex, Payload, VectorIndex, VectorPoint};
use serde_json::json;

const DIM: usize = 16;

/// Generate a non-zero L2-normalized vector of the given dimension.
fn arb_normalized_vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero vector", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

/// Generate a point with a normalized vector and a minimal chunk payload.
fn arb_point(dim: usize) -> impl Strategy<Value = VectorPoint> {
    (0u64..10_000, "[a-z ]{5,30}", arb_normalized_vector(dim)).prop_map(|(id, text, vector)| {
        let mut payload = Payload::new();
        payload.insert("document_id".to_string(), json!("doc_aaaa1111_bbbb2222"));
        payload.insert("chunk_index".to_string(), json!(id));
        payload.insert("text".to_string(), json!(text));
        VectorPoint { id, vector, payload }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any set of stored points, search returns results ordered by
    /// descending cosine similarity, and never more than `limit` of them.
    #[test]
    fn search_is_ordered_and_bounded(
        points in proptest::collection::vec(arb_point(DIM), 1..20),
        query in arb_normalized_vector(DIM),
        limit in 1usize..25,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, unique_count) = rt.block_on(async {
            let index = InMemoryIndex::new();
            index.ensure_collection("prop", DIM, false).await.unwrap();

            // Deduplicate by id so upsert overwrites don't shrink the set
            // unpredictably mid-assertion.
            let mut deduped: HashMap<u64, VectorPoint> = HashMap::new();
            for point in &points {
                deduped.entry(point.id).or_insert_with(|| point.clone());
            }
            let unique: Vec<VectorPoint> = deduped.into_values().collect();
            let count = unique.len();

            index.upsert("prop", &unique).await.unwrap();
            let results = index.search("prop", &query, limit).await.unwrap();
            (results, count)
        });

        prop_assert!(results.len() <= limit);
        prop_assert!(results.len() <= unique_count);
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for result in &results {
            prop_assert!(result.score.is_finite());
        }
    }

    /// Upserting the same id twice keeps exactly one point.
    #[test]
    fn reupsert_is_idempotent(
        point in arb_point(DIM),
        query in arb_normalized_vector(DIM),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let results = rt.block_on(async {
            let index = InMemoryIndex::new();
            index.ensure_collection("prop", DIM, false).await.unwrap();
            index.upsert("prop", &[point.clone()]).await.unwrap();
            index.upsert("prop", &[point.clone()]).await.unwrap();
            index.search("prop", &query, 10).await.unwrap()
        });
        prop_assert_eq!(results.len(), 1);
    }
}
