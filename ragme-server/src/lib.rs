//! HTTP front end for the RAGme knowledge-base service.
//!
//! Thin axum layer over [`ragme_core::RagPipeline`]: request parsing,
//! payload re-projection, and error-to-status mapping. All retrieval logic
//! lives in `ragme-core`.

pub mod server;
