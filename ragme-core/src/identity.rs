//! Identifier derivation for documents, chunks, and index points.
//!
//! Document ids are content-addressed for traceability with a random suffix
//! for uniqueness; point ids are a stable numeric reduction of the chunk id
//! into the index's legal id range.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Derive a unique document id for one ingestion of `content`.
///
/// Format: `doc_{hash}_{suffix}` where `hash` is the first 8 hex characters
/// of SHA-256 over the content and `suffix` is 8 random hex characters. The
/// hash segment exists for human traceability and dedup auditing only; the
/// random suffix is what makes repeated ingestion of identical content
/// produce distinct ids.
pub fn document_id(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let content_hash = hex::encode(&digest[..4]);
    let suffix = Uuid::new_v4().simple().to_string();
    format!("doc_{content_hash}_{}", &suffix[..8])
}

/// Derive the id of chunk `index` of the document `document_id`.
pub fn chunk_id(document_id: &str, index: usize) -> String {
    format!("{document_id}_chunk_{index}")
}

/// Reduce a chunk id to a numeric point id for the vector index.
///
/// Takes the first 8 bytes of SHA-256 over the chunk id and masks the
/// result into the non-negative 63-bit range. Deterministic, so re-upserting
/// the same chunk id always hits the same point. Collisions between distinct
/// chunk ids are possible but rare and are not detected.
pub fn point_id(chunk_id: &str) -> u64 {
    let digest = Sha256::digest(chunk_id.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix) & (i64::MAX as u64)
}
