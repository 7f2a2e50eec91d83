//! Webhook dispatcher
//!
//! Delivers every chunk of a split statement to the configured automation
//! webhook as one multipart request. The dispatcher holds no state between
//! calls; a failed dispatch is reported as data, never as a panic or an
//! early return, so the caller always sees what was attempted.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

use crate::config::WebhookConfig;
use crate::pdf::ChunkArtifact;

use super::types::{
    ChunkDescriptor, DispatchFailure, DispatchMetadata, DispatchOutcome, DispatchSummary,
    WebhookEcho, PDF_CONTENT_TYPE,
};

/// Sends chunked statements to the automation webhook.
///
/// Built once at startup from [`WebhookConfig`]; the destination URL and
/// timeout are injected here rather than read from process-wide globals so
/// tests can point the dispatcher at a local stand-in.
pub struct WebhookDispatcher {
    http: Client,
    config: WebhookConfig,
}

impl WebhookDispatcher {
    pub fn new(config: WebhookConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self { http, config }
    }

    /// Send all chunk artifacts plus metadata in a single multipart request.
    ///
    /// The transmission is atomic from this side: one request, one response.
    /// Any transport failure (unreachable host, timeout, non-2xx status)
    /// produces a `success: false` outcome that still carries the summary
    /// and the full per-chunk descriptor list. There is no retry here;
    /// callers retry by re-invoking `send`.
    pub async fn send(
        &self,
        artifacts: Vec<ChunkArtifact>,
        metadata: DispatchMetadata,
    ) -> DispatchOutcome {
        let summary = DispatchSummary::new(&metadata, &artifacts);
        let chunks: Vec<ChunkDescriptor> =
            artifacts.iter().map(ChunkDescriptor::from_artifact).collect();

        let form = match build_form(&metadata, artifacts) {
            Ok(form) => form,
            Err(err) => {
                tracing::error!("Failed to assemble multipart payload: {}", err);
                let failure = DispatchFailure {
                    message: err.to_string(),
                    code: None,
                    response: None,
                };
                return DispatchOutcome::failed(summary, failure, chunks);
            }
        };

        tracing::info!(
            url = %self.config.url,
            total_chunks = summary.total_chunks,
            total_bytes = summary.total_size,
            "Sending all chunks to webhook in a single request"
        );

        match self.http.post(&self.config.url).multipart(form).send().await {
            Ok(response) => {
                let status = response.status();
                let status_text = status.canonical_reason().unwrap_or("").to_string();
                let data = read_body(response).await;

                if status.is_success() {
                    tracing::info!(status = status.as_u16(), "All chunks delivered to webhook");
                    let echo = WebhookEcho {
                        status: status.as_u16(),
                        status_text,
                        data,
                    };
                    DispatchOutcome::delivered(summary, echo, chunks)
                } else {
                    tracing::warn!(status = status.as_u16(), "Webhook rejected the dispatch");
                    let failure = DispatchFailure {
                        message: format!("Webhook returned HTTP {}", status.as_u16()),
                        code: Some(status.as_u16().to_string()),
                        response: Some(data),
                    };
                    DispatchOutcome::failed(summary, failure, chunks)
                }
            }
            Err(err) => {
                tracing::error!("Failed to reach webhook: {}", err);
                let failure = DispatchFailure {
                    message: err.to_string(),
                    code: transport_code(&err),
                    response: None,
                };
                DispatchOutcome::failed(summary, failure, chunks)
            }
        }
    }
}

/// Assemble the multipart body: three metadata text parts, then for each
/// chunk a binary `chunks` part named after the chunk file plus a
/// `chunk_<n>_info` text part describing it.
fn build_form(
    metadata: &DispatchMetadata,
    artifacts: Vec<ChunkArtifact>,
) -> reqwest::Result<Form> {
    let mut form = Form::new()
        .text("originalFileName", metadata.original_file_name.clone())
        .text("totalPages", metadata.total_pages.to_string())
        .text("totalChunks", metadata.total_chunks.to_string());

    for artifact in artifacts {
        let info = serde_json::json!({
            "chunkNumber": artifact.ordinal,
            "pageRange": artifact.range.display(),
            "fileSize": artifact.file_size(),
        })
        .to_string();
        let info_key = format!("chunk_{}_info", artifact.ordinal);

        let part = Part::bytes(artifact.bytes)
            .file_name(artifact.file_name)
            .mime_str(PDF_CONTENT_TYPE)?;

        form = form.part("chunks", part).text(info_key, info);
    }

    Ok(form)
}

/// Read the response body, preferring parsed JSON over the raw string
async fn read_body(response: reqwest::Response) -> serde_json::Value {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
}

/// Map a reqwest error to the transport code reported to callers
fn transport_code(err: &reqwest::Error) -> Option<String> {
    if err.is_timeout() {
        Some("ETIMEDOUT".to_string())
    } else if err.is_connect() {
        Some("ECONNREFUSED".to_string())
    } else {
        None
    }
}
