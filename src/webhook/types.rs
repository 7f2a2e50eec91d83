//! Dispatch types
//!
//! The JSON shapes returned to the caller after a dispatch attempt. The
//! chunk payloads themselves never appear here; reports carry descriptors
//! only.

use serde::{Deserialize, Serialize};

use crate::pdf::ChunkArtifact;

/// Content type attached to every chunk file part
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Source-document metadata accompanying a dispatch
#[derive(Debug, Clone)]
pub struct DispatchMetadata {
    pub original_file_name: String,
    pub total_pages: usize,
    pub total_chunks: usize,
    /// Configured pages-per-chunk, echoed in the summary
    pub chunk_size: usize,
}

/// Aggregate view of what a dispatch carried (or would have carried)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub original_file_name: String,
    pub total_pages: usize,
    pub total_chunks: usize,
    pub chunk_size: usize,
    /// Sum of all chunk byte lengths
    pub total_size: usize,
}

impl DispatchSummary {
    pub fn new(metadata: &DispatchMetadata, artifacts: &[ChunkArtifact]) -> Self {
        Self {
            original_file_name: metadata.original_file_name.clone(),
            total_pages: metadata.total_pages,
            total_chunks: metadata.total_chunks,
            chunk_size: metadata.chunk_size,
            total_size: artifacts.iter().map(ChunkArtifact::file_size).sum(),
        }
    }
}

/// Report entry for one chunk; deliberately excludes the payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkDescriptor {
    pub chunk_number: usize,
    /// 1-based inclusive display range, e.g. `"4-6"`
    pub page_range: String,
    pub chunk_file_name: String,
    pub file_size: usize,
}

impl ChunkDescriptor {
    pub fn from_artifact(artifact: &ChunkArtifact) -> Self {
        Self {
            chunk_number: artifact.ordinal,
            page_range: artifact.range.display(),
            chunk_file_name: artifact.file_name.clone(),
            file_size: artifact.file_size(),
        }
    }
}

/// Echo of the webhook's response on a successful dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEcho {
    pub status: u16,
    pub status_text: String,
    /// Response body, parsed as JSON when possible, raw string otherwise
    pub data: serde_json::Value,
}

/// What went wrong when a dispatch failed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchFailure {
    pub message: String,
    /// Transport-level code (`ETIMEDOUT`, `ECONNREFUSED`) or the HTTP status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Body returned by the webhook before the failure was detected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

/// Unified result of sending all chunks to the webhook.
///
/// A failed dispatch still carries the summary and the full descriptor
/// list, so the caller can see what would have been sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub success: bool,
    pub message: String,
    pub summary: DispatchSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_response: Option<WebhookEcho>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DispatchFailure>,
    pub chunks: Vec<ChunkDescriptor>,
}

impl DispatchOutcome {
    /// Outcome for a dispatch the webhook accepted
    pub fn delivered(
        summary: DispatchSummary,
        echo: WebhookEcho,
        chunks: Vec<ChunkDescriptor>,
    ) -> Self {
        let message = format!(
            "Successfully sent {} chunks to webhook",
            summary.total_chunks
        );
        Self {
            success: true,
            message,
            summary,
            webhook_response: Some(echo),
            error: None,
            chunks,
        }
    }

    /// Outcome for a dispatch that failed at the transport or HTTP level
    pub fn failed(
        summary: DispatchSummary,
        failure: DispatchFailure,
        chunks: Vec<ChunkDescriptor>,
    ) -> Self {
        let message = format!("Failed to send chunks to webhook: {}", failure.message);
        Self {
            success: false,
            message,
            summary,
            webhook_response: None,
            error: Some(failure),
            chunks,
        }
    }
}
