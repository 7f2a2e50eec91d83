//! Chunking types
//!
//! Value objects produced by the statement split. All of them are
//! request-scoped; nothing here survives past the response.

use thiserror::Error;

/// A half-open range `[start, end)` of zero-based page indices.
///
/// Ranges produced by the chunker are contiguous, non-overlapping, and
/// cover the whole document in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    /// First page index covered by the range
    pub start: usize,
    /// One past the last page index covered by the range
    pub end: usize,
}

impl PageRange {
    /// Number of pages in the range
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// 1-based inclusive form used in reports, e.g. `"4-6"` or `"7-7"`
    pub fn display(&self) -> String {
        format!("{}-{}", self.start + 1, self.end)
    }
}

/// One split result: an independently openable PDF covering a page range
#[derive(Debug, Clone)]
pub struct ChunkArtifact {
    /// 1-based position in emission order
    pub ordinal: usize,
    /// Pages of the source this chunk covers
    pub range: PageRange,
    /// Derived file name, e.g. `statement_chunk_2.pdf`
    pub file_name: String,
    /// Serialized PDF bytes
    pub bytes: Vec<u8>,
}

impl ChunkArtifact {
    /// Size of the serialized chunk in bytes
    pub fn file_size(&self) -> usize {
        self.bytes.len()
    }
}

/// Errors produced while splitting a statement PDF
#[derive(Debug, Error)]
pub enum SplitError {
    /// The uploaded bytes could not be parsed as a PDF
    #[error("Failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),

    /// A chunk document could not be serialized
    #[error("Failed to serialize chunk {ordinal}: {source}")]
    Serialize { ordinal: usize, source: lopdf::Error },

    /// Chunk size must be at least one page
    #[error("Chunk size must be at least 1")]
    InvalidChunkSize,
}
