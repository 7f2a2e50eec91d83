//! Webhook dispatch
//!
//! Packages all chunk artifacts plus metadata into one multipart
//! transmission and delivers it to the configured automation webhook,
//! reporting a unified success/failure outcome.

pub mod dispatcher;
pub mod types;

pub use dispatcher::WebhookDispatcher;
pub use types::{
    ChunkDescriptor, DispatchFailure, DispatchMetadata, DispatchOutcome, DispatchSummary,
    WebhookEcho, PDF_CONTENT_TYPE,
};
