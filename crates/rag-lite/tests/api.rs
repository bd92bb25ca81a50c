//! Router-level tests with in-process providers

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use rag_lite::{
    generation::NOT_FOUND_ANSWER,
    providers::{ApiKey, ChatProvider, EmbeddingProvider, LocalVectorStore},
    retrieval::VectorStore,
    server::{state::AppState, RagServer},
    Error, RagConfig, Result,
};

const BOUNDARY: &str = "rag-lite-test-boundary";
const KEY: &str = "sk-test-key";
const DIMENSION: usize = 64;

/// Upstream failure selected by the key, e.g. `sk-embed-throttled` fails embedding with 429
fn scripted_failure(api_key: &ApiKey, stage: &str) -> Option<Error> {
    let kind = api_key.expose().strip_prefix("sk-")?.strip_prefix(stage)?;
    match kind {
        "-revoked" => Some(Error::UpstreamAuth("Incorrect API key provided".to_string())),
        "-throttled" => Some(Error::RateLimited("Rate limit reached".to_string())),
        "-broken" => Some(Error::Upstream("500 Internal Server Error".to_string())),
        _ => None,
    }
}

/// Bag-of-words hashing embedder; texts sharing words land close together
struct HashEmbedder {
    drop_last: bool,
}

impl HashEmbedder {
    fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            v[(hasher.finish() as usize) % DIMENSION] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1.0);
        v.iter().map(|x| x / norm).collect()
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed_batch(&self, texts: &[String], api_key: &ApiKey) -> Result<Vec<Vec<f32>>> {
        if let Some(err) = scripted_failure(api_key, "embed") {
            return Err(err);
        }
        let mut vectors: Vec<Vec<f32>> = texts.iter().map(|t| Self::vector(t)).collect();
        if self.drop_last {
            vectors.pop();
        }
        Ok(vectors)
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// Answers by quoting the nearest excerpt
struct EchoChat;

#[async_trait]
impl ChatProvider for EchoChat {
    async fn complete(&self, _query: &str, contexts: &[String], api_key: &ApiKey) -> Result<String> {
        if let Some(err) = scripted_failure(api_key, "chat") {
            return Err(err);
        }
        Ok(match contexts.first() {
            Some(context) => format!("According to the documents: {}", context),
            None => NOT_FOUND_ANSWER.to_string(),
        })
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-1"
    }
}

struct TestApp {
    router: Router,
    uploads: TempDir,
}

fn test_app_with(embedder: HashEmbedder) -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let mut config = RagConfig::default();
    config.storage.upload_dir = uploads.path().to_path_buf();

    let store = Arc::new(LocalVectorStore::new(Arc::new(
        VectorStore::open_in_memory("document_embeddings").unwrap(),
    )));
    let state =
        AppState::with_providers(config, store, Arc::new(embedder), Arc::new(EchoChat)).unwrap();

    TestApp {
        router: RagServer::router(state),
        uploads,
    }
}

fn test_app() -> TestApp {
    test_app_with(HashEmbedder { drop_last: false })
}

fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(key: Option<&str>, filename: &str, content: &[u8]) -> Request<Body> {
    upload_field_request(key, "file", filename, content)
}

fn upload_field_request(
    key: Option<&str>,
    field: &str,
    filename: &str,
    content: &[u8],
) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/upload/")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder
        .body(Body::from(multipart_body(field, filename, content)))
        .unwrap()
}

fn chat_request(key: Option<&str>, query: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/chat/")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn upload_dir_is_empty(app: &TestApp) -> bool {
    std::fs::read_dir(app.uploads.path()).unwrap().next().is_none()
}

#[tokio::test]
async fn test_upload_chat_clear_scenario() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        upload_request(
            Some(KEY),
            "notes.txt",
            b"Paris is the capital of France.",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "notes.txt");
    assert_eq!(body["chunk_count"], 1);
    assert_eq!(body["vector_count"], 1);
    assert_eq!(
        body["message"],
        "Document processed and embeddings stored successfully."
    );
    assert!(upload_dir_is_empty(&app));

    let (status, body) = send(&app.router, empty_request("GET", "/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collection"], "document_embeddings");
    assert_eq!(body["count"], 1);

    let (status, body) = send(
        &app.router,
        chat_request(Some(KEY), "What is the capital of France?"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["response"].as_str().unwrap().contains("Paris"));

    let (status, body) = send(&app.router, empty_request("POST", "/clear/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Vector store collection cleared successfully."
    );

    let (status, body) = send(
        &app.router,
        chat_request(Some(KEY), "What is the capital of France?"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], NOT_FOUND_ANSWER);
}

#[tokio::test]
async fn test_reupload_overwrites_records() {
    let app = test_app();
    let content = b"Rust guarantees memory safety without a garbage collector.";

    for _ in 0..2 {
        let (status, _) = send(&app.router, upload_request(Some(KEY), "rust.md", content)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app.router, empty_request("GET", "/stats")).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_missing_api_key() {
    let app = test_app();

    let (status, body) = send(&app.router, upload_request(None, "notes.txt", b"hello")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["type"], "missing_api_key");

    let (status, body) = send(&app.router, chat_request(Some("   "), "hello?")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["type"], "missing_api_key");
}

#[tokio::test]
async fn test_non_openai_key_is_accepted() {
    let app = test_app();
    let (status, _) = send(
        &app.router,
        upload_request(Some("custom-gateway-key"), "notes.txt", b"Some text."),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        upload_request(Some(KEY), "report.docx", b"binary"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "unsupported_type");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains(".docx"));
    assert!(message.contains(".txt, .pdf, .md"));
    assert!(upload_dir_is_empty(&app));
}

#[tokio::test]
async fn test_empty_document_is_unprocessable() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        upload_request(Some(KEY), "blank.txt", b"  \n\n\t "),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["type"], "empty_document");
    assert!(upload_dir_is_empty(&app));
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        upload_field_request(Some(KEY), "document", "notes.txt", b"hello"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request");
}

const UPSTREAM_FAILURES: [(&str, StatusCode, &str); 3] = [
    ("revoked", StatusCode::UNAUTHORIZED, "upstream_auth_error"),
    ("throttled", StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
    ("broken", StatusCode::BAD_GATEWAY, "upstream_error"),
];

#[tokio::test]
async fn test_embedding_failures_on_upload_and_chat() {
    let app = test_app();

    for (kind, expected_status, expected_type) in UPSTREAM_FAILURES {
        let key = format!("sk-embed-{}", kind);

        let (status, body) = send(
            &app.router,
            upload_request(Some(&key), "notes.txt", b"Some text."),
        )
        .await;
        assert_eq!(status, expected_status, "upload with {}", key);
        assert_eq!(body["error"]["type"], expected_type);
        assert!(upload_dir_is_empty(&app));

        let (status, body) = send(&app.router, chat_request(Some(&key), "Anything?")).await;
        assert_eq!(status, expected_status, "chat with {}", key);
        assert_eq!(body["error"]["type"], expected_type);
    }

    let (_, body) = send(&app.router, empty_request("GET", "/stats")).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_chat_failures_are_errors_not_answers() {
    let app = test_app();

    for (kind, expected_status, expected_type) in UPSTREAM_FAILURES {
        let key = format!("sk-chat-{}", kind);

        // Upload never calls the chat model
        let (status, _) = send(
            &app.router,
            upload_request(Some(&key), "notes.txt", b"Paris is the capital of France."),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app.router,
            chat_request(Some(&key), "What is the capital of France?"),
        )
        .await;
        assert_eq!(status, expected_status, "chat with {}", key);
        assert_eq!(body["error"]["type"], expected_type);
        assert!(body.get("response").is_none());
    }
}

#[tokio::test]
async fn test_concurrent_uploads_with_same_filename() {
    let app = test_app();

    let (first, second) = tokio::join!(
        send(
            &app.router,
            upload_request(Some(KEY), "notes.txt", b"Paris is the capital of France."),
        ),
        send(
            &app.router,
            upload_request(Some(KEY), "notes.txt", b"Berlin is the capital of Germany."),
        ),
    );

    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);
    assert!(upload_dir_is_empty(&app));

    // Both wrote notes.txt_chunk0; the later add wins
    let (_, body) = send(&app.router, empty_request("GET", "/stats")).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_embedding_count_mismatch() {
    let app = test_app_with(HashEmbedder { drop_last: true });
    let (status, body) = send(
        &app.router,
        upload_request(Some(KEY), "notes.txt", b"Some text."),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "count_mismatch");
    assert!(upload_dir_is_empty(&app));

    let (_, body) = send(&app.router, empty_request("GET", "/stats")).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_blank_query_rejected() {
    let app = test_app();
    let (status, body) = send(&app.router, chat_request(Some(KEY), "   ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request");
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let app = test_app();
    for _ in 0..2 {
        let (status, _) = send(&app.router, empty_request("POST", "/clear/")).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}
