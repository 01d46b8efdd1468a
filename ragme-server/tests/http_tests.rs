//! Router tests against an in-process pipeline (hash embedder + in-memory
//! index), exercised with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use ragme_core::{HashEmbeddingProvider, InMemoryIndex, KbConfig, RagPipeline};
use ragme_server::server::{AppState, IngestResponse, QueryResponse, app_router};
use serde_json::{Value, json};
use tower::ServiceExt;

const DIM: usize = 64;

async fn test_router() -> Router {
    let config = KbConfig::builder()
        .chunk_size(60)
        .chunk_overlap(10)
        .top_k(5)
        .embedding_dimension(DIM)
        .build()
        .unwrap();
    let pipeline = Arc::new(
        RagPipeline::builder()
            .config(config)
            .embedding_provider(Arc::new(HashEmbeddingProvider::new(DIM)))
            .index(Arc::new(InMemoryIndex::new()))
            .build()
            .unwrap(),
    );
    pipeline.ensure_ready().await.unwrap();
    app_router(AppState { pipeline })
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_service_name() {
    let router = test_router().await;
    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "ragme-server");
}

#[tokio::test]
async fn ingest_then_query_round_trip() {
    let router = test_router().await;

    let ingest = router
        .clone()
        .oneshot(json_request(
            "/ingest",
            json!({
                "content": "Qdrant stores vectors and searches them by cosine similarity.",
                "metadata": {"topic": "vector-db"}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(ingest.status(), StatusCode::OK);
    let ingest: IngestResponse = serde_json::from_value(body_json(ingest).await).unwrap();
    assert_eq!(ingest.status, "success");
    assert!(ingest.chunks_created >= 1);

    let query = router
        .oneshot(json_request(
            "/query",
            json!({"query": "Qdrant stores vectors and searches them by cosine similarity."}),
        ))
        .await
        .unwrap();
    assert_eq!(query.status(), StatusCode::OK);
    let query: QueryResponse = serde_json::from_value(body_json(query).await).unwrap();
    assert!(query.num_results >= 1);
    assert_eq!(query.results[0].document_id.as_deref(), Some(ingest.document_id.as_str()));
    assert_eq!(query.results[0].metadata["topic"], json!("vector-db"));
    assert!(query.context.starts_with("[1] (Score: "));
}

#[tokio::test]
async fn search_is_an_alias_for_query() {
    let router = test_router().await;

    router
        .clone()
        .oneshot(json_request("/ingest", json!({"content": "searchable text body"})))
        .await
        .unwrap();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/search?q=searchable%20text%20body&limit=3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: QueryResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert!(body.num_results >= 1);
    assert_eq!(body.query, "searchable text body");
}

#[tokio::test]
async fn query_on_empty_collection_returns_empty_results() {
    let router = test_router().await;
    let response =
        router.oneshot(json_request("/query", json!({"query": "nothing here"}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: QueryResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(body.num_results, 0);
    assert!(body.results.is_empty());
    assert_eq!(body.context, "");
}

#[tokio::test]
async fn zero_limit_is_a_client_error() {
    let router = test_router().await;
    let response = router
        .oneshot(json_request("/query", json!({"query": "whatever", "limit": 0})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("limit"));
}

#[tokio::test]
async fn file_upload_rejects_non_utf8_bytes() {
    let router = test_router().await;

    let boundary = "X-RAGME-TEST-BOUNDARY";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"blob.bin\"\r\n\
          Content-Type: application/octet-stream\r\n\r\n",
    );
    body.extend_from_slice(&[0xff, 0xfe, 0xfd]);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ingest/file")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("UTF-8"));
}

#[tokio::test]
async fn file_upload_ingests_text_with_file_metadata() {
    let router = test_router().await;

    let boundary = "X-RAGME-TEST-BOUNDARY";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
          Content-Type: text/plain\r\n\r\n",
    );
    body.extend_from_slice(b"plain text notes about embeddings");
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ingest/file")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ingest: IngestResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(ingest.status, "success");

    let query = router
        .oneshot(json_request(
            "/query",
            json!({"query": "plain text notes about embeddings"}),
        ))
        .await
        .unwrap();
    let query: QueryResponse = serde_json::from_value(body_json(query).await).unwrap();
    assert_eq!(query.results[0].metadata["filename"], json!("notes.txt"));
    assert_eq!(query.results[0].metadata["content_type"], json!("text/plain"));
}
