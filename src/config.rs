//! Configuration management for Rekon Server

use serde::Deserialize;
use std::env;

/// Default pages per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 3;

/// Default webhook timeout: 60 seconds, since the aggregate payload can be
/// large (every chunk travels in one request)
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 60;

/// Default upload ceiling: 512MB
const DEFAULT_MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub webhook: WebhookConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Destination for the single outbound dispatch (an n8n webhook in the
    /// default deployment)
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Pages per chunk, at least 1
    pub chunk_size: usize,
    /// Request body ceiling for the upload endpoint
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            webhook: WebhookConfig {
                url: "http://localhost:5678/webhook/statement-import".to_string(),
                timeout_secs: DEFAULT_WEBHOOK_TIMEOUT_SECS,
            },
            ingest: IngestConfig {
                chunk_size: DEFAULT_CHUNK_SIZE,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            webhook: WebhookConfig {
                url: env::var("WEBHOOK_URL")?,
                timeout_secs: env::var("WEBHOOK_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECS),
            },
            ingest: IngestConfig {
                chunk_size: env::var("CHUNK_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|&n| n >= 1)
                    .unwrap_or(DEFAULT_CHUNK_SIZE),
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            },
        })
    }
}
