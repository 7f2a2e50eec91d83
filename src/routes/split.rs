//! Statement split endpoint
//!
//! POST /api/pdf/split - accepts a multipart upload with a single `file`
//! field, splits the statement into fixed-size page chunks, and forwards
//! all chunks to the automation webhook in one request.
//!
//! Two failure tiers: an unreadable upload or unparseable PDF is a 400/500,
//! while a downstream dispatch failure still answers 200 with
//! `success: false` so the caller can inspect what was attempted.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::pdf::chunker;
use crate::state::AppState;
use crate::webhook::{DispatchMetadata, DispatchOutcome, PDF_CONTENT_TYPE};

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Create the split router
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/split", post(split_statement))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// POST /api/pdf/split
///
/// The whole flow is request-scoped: upload -> chunk -> dispatch ->
/// report. Nothing is persisted; a caller that wants a retry re-submits
/// the original file.
async fn split_statement(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DispatchOutcome>, (StatusCode, Json<ErrorResponse>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_details("No file uploaded", e.to_string())),
        )
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(|s| s.to_string());
        if content_type.as_deref() != Some(PDF_CONTENT_TYPE) {
            tracing::warn!(content_type = ?content_type, "Rejected upload with non-PDF content type");
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("File must be a PDF")),
            ));
        }

        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "statement.pdf".to_string());

        let data = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read file data: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_details("No file uploaded", e.to_string())),
            )
        })?;

        upload = Some((file_name, data.to_vec()));
        break;
    }

    let Some((file_name, data)) = upload else {
        tracing::warn!("No file field found in multipart upload");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("No file uploaded")),
        ));
    };

    let chunk_size = state.config().ingest.chunk_size;
    tracing::info!(
        file_name = %file_name,
        bytes = data.len(),
        chunk_size,
        "Processing statement PDF"
    );

    // Chunk construction is CPU-bound lopdf work; run it off the async
    // runtime. Dispatch must not start until every chunk buffer is ready,
    // so the await below is also the construction barrier.
    let source_name = file_name.clone();
    let artifacts = tokio::task::spawn_blocking(move || {
        chunker::split_document(&source_name, &data, chunk_size)
    })
    .await
    .map_err(|e| {
        tracing::error!("Chunking task failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::with_details("Failed to process PDF", e.to_string())),
        )
    })?
    .map_err(|e| {
        tracing::error!("Failed to process PDF: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::with_details("Failed to process PDF", e.to_string())),
        )
    })?;

    let metadata = DispatchMetadata {
        original_file_name: file_name,
        total_pages: artifacts.iter().map(|a| a.range.len()).sum(),
        total_chunks: artifacts.len(),
        chunk_size,
    };

    let outcome = state.dispatcher().send(artifacts, metadata).await;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::json;
    use tower::ServiceExt;

    const BOUNDARY: &str = "rekon-test-boundary";

    fn test_app(webhook_url: &str) -> Router {
        let mut config = Config::default();
        config.webhook.url = webhook_url.to_string();
        config.webhook.timeout_secs = 5;

        let state = AppState::new(config);
        Router::new()
            .nest("/api/pdf", router(64 * 1024 * 1024))
            .with_state(state)
    }

    fn file_upload_request(file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        multipart_request(body)
    }

    fn text_field_request(name: &str, value: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
        )
        .into_bytes();

        multipart_request(body)
    }

    fn multipart_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/pdf/split")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Stub webhook that records the names of the parts it received
    async fn capture_hook(
        mut multipart: Multipart,
    ) -> Json<serde_json::Value> {
        let mut names = Vec::new();
        let mut files = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            names.push(field.name().unwrap_or_default().to_string());
            if let Some(file_name) = field.file_name() {
                files.push(file_name.to_string());
            }
            let _ = field.bytes().await.unwrap();
        }
        Json(json!({ "names": names, "files": files }))
    }

    async fn spawn_capture_hook() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/hook", post(capture_hook));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/hook", addr)
    }

    #[tokio::test]
    async fn test_missing_file_field_is_rejected() {
        let app = test_app("http://localhost:1/hook");

        let response = app
            .oneshot(text_field_request("note", "no file here"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_non_pdf_content_type_is_rejected() {
        let app = test_app("http://localhost:1/hook");

        let response = app
            .oneshot(file_upload_request("notes.txt", "text/plain", b"hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["error"], "File must be a PDF");
    }

    #[tokio::test]
    async fn test_unparseable_pdf_is_a_server_error() {
        let app = test_app("http://localhost:1/hook");

        let response = app
            .oneshot(file_upload_request(
                "statement.pdf",
                "application/pdf",
                b"definitely not a pdf",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response_json(response).await;
        assert_eq!(body["error"], "Failed to process PDF");
        assert!(body["details"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_seven_page_statement_end_to_end() {
        let webhook_url = spawn_capture_hook().await;
        let app = test_app(&webhook_url);

        let pdf = chunker::sample_pdf(7);
        let response = app
            .oneshot(file_upload_request("statement.pdf", "application/pdf", &pdf))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["summary"]["originalFileName"], "statement.pdf");
        assert_eq!(body["summary"]["totalPages"], 7);
        assert_eq!(body["summary"]["totalChunks"], 3);
        assert_eq!(body["summary"]["chunkSize"], 3);

        let chunks = body["chunks"].as_array().unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0]["pageRange"], "1-3");
        assert_eq!(chunks[1]["pageRange"], "4-6");
        assert_eq!(chunks[2]["pageRange"], "7-7");
        assert_eq!(chunks[0]["chunkFileName"], "statement_chunk_1.pdf");
        assert_eq!(chunks[2]["chunkFileName"], "statement_chunk_3.pdf");

        // The stub saw exactly one transmission: metadata parts, three
        // binary chunk parts, and one info part per chunk.
        let seen = &body["webhookResponse"]["data"];
        let names: Vec<&str> = seen["names"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n.as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "originalFileName",
                "totalPages",
                "totalChunks",
                "chunks",
                "chunk_1_info",
                "chunks",
                "chunk_2_info",
                "chunks",
                "chunk_3_info",
            ]
        );
        let files: Vec<&str> = seen["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f.as_str().unwrap())
            .collect();
        assert_eq!(
            files,
            vec![
                "statement_chunk_1.pdf",
                "statement_chunk_2.pdf",
                "statement_chunk_3.pdf",
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_page_statement_still_dispatches() {
        let webhook_url = spawn_capture_hook().await;
        let app = test_app(&webhook_url);

        let pdf = chunker::sample_pdf(0);
        let response = app
            .oneshot(file_upload_request("empty.pdf", "application/pdf", &pdf))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["summary"]["totalPages"], 0);
        assert_eq!(body["summary"]["totalChunks"], 0);
        assert_eq!(body["chunks"].as_array().unwrap().len(), 0);

        // Metadata parts alone reached the webhook
        let names = body["webhookResponse"]["data"]["names"].as_array().unwrap();
        assert_eq!(names.len(), 3);
    }

    #[tokio::test]
    async fn test_dispatch_failure_still_answers_ok() {
        // A bound-then-dropped port guarantees connection refused
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let app = test_app(&format!("http://{}/hook", addr));
        let pdf = chunker::sample_pdf(7);
        let response = app
            .oneshot(file_upload_request("statement.pdf", "application/pdf", &pdf))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;

        assert_eq!(body["success"], false);
        assert_eq!(body["summary"]["totalChunks"], 3);
        assert!(!body["error"]["message"].as_str().unwrap().is_empty());
        // The caller still sees what would have been sent
        assert_eq!(body["chunks"].as_array().unwrap().len(), 3);
    }
}
