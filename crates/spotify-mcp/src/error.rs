//! Error types for the MCP crate.
//!
//! Every variant here is a hard failure rendered as a JSON-RPC error. Soft
//! failures (missing search parameters, unknown tool names) are ordinary
//! [`CallToolResponse`](crate::protocol::CallToolResponse) values instead.

use crate::protocol::error_codes;
use serde_json::{Value, json};
use spotify_api::SpotifyError;
use thiserror::Error;

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Unknown JSON-RPC method.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Malformed or missing request parameters.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Resource URI not served by this server.
    #[error("Unknown resource: {uri}")]
    UnknownResource { uri: String },

    /// Error raised by the Spotify client, passed through unchanged.
    #[error(transparent)]
    Provider(#[from] SpotifyError),

    /// Transport error.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl McpError {
    /// JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            McpError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            McpError::UnknownResource { .. } => error_codes::RESOURCE_NOT_FOUND,
            _ => error_codes::INTERNAL_ERROR,
        }
    }

    /// Structured data attached to the JSON-RPC error.
    pub fn data(&self) -> Option<Value> {
        match self {
            McpError::UnknownResource { uri } => Some(json!({ "uri": uri })),
            McpError::Provider(e) => e.status().map(|status| json!({ "status": status })),
            _ => None,
        }
    }
}
