//! PDF chunking
//!
//! Splits an uploaded statement PDF into ordered, fixed-size page groups,
//! each materialized as an independent PDF document ready for dispatch.

pub mod chunker;
pub mod types;

pub use chunker::{chunk_file_name, page_ranges, split_document};
pub use types::{ChunkArtifact, PageRange, SplitError};
