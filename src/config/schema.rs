//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::net::buffer::DEFAULT_CHUNK_SIZE;

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Worker pool sizing.
    pub workers: WorkerConfig,

    /// Per-request read and execution limits.
    pub limits: LimitsConfig,

    /// CORS headers applied to every response.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of worker tasks serving connections.
    pub count: usize,

    /// Queue capacity per worker; both queues hold `count * queue_multiplier`.
    pub queue_multiplier: usize,
}

impl WorkerConfig {
    /// Capacity of the receive and work queues.
    pub fn queue_capacity(&self) -> usize {
        self.count.saturating_mul(self.queue_multiplier).max(1)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            count: 10,
            queue_multiplier: 10,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Deadline for receiving one complete request, in seconds.
    pub read_deadline_secs: u64,

    /// Bytes pulled from the socket per refill.
    pub read_chunk_size: usize,

    /// Maximum bytes read for one request (line, headers and body).
    pub max_request_bytes: usize,

    /// Optional bound on middleware plus handler time, in seconds.
    pub handler_timeout_secs: Option<u64>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            read_deadline_secs: 10,
            read_chunk_size: DEFAULT_CHUNK_SIZE,
            max_request_bytes: 2 * 1024 * 1024,
            handler_timeout_secs: None,
        }
    }
}

/// CORS header values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// `Access-Control-Allow-Origin`.
    pub allow_origin: String,

    /// `Access-Control-Allow-Headers`.
    pub allow_headers: String,

    /// `Access-Control-Allow-Methods`.
    pub allow_methods: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_headers: "*".to_string(),
            allow_methods: "GET, PUT, POST, DELETE, HEAD, PATCH".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Suppress startup diagnostics such as the route tree.
    pub silent: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            silent: false,
        }
    }
}
