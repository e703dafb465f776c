//! Configuration types for the Spotify MCP server.
//!
//! All values are sourced from the process environment by the server binary
//! (see `spotify-server`), but the types here are plain serde structs so they
//! can also be built from JSON or constructed directly in tests.
//!
//! # Sections
//!
//! - **mcp**: server identity and the HTTP/SSE listener settings
//! - **spotify**: application credentials and Web API endpoints

pub mod mcp;
pub mod spotify;

use serde::{Deserialize, Serialize};

pub use mcp::McpConfig;
pub use spotify::SpotifyConfig;

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// MCP server settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Spotify client settings.
    #[serde(default)]
    pub spotify: SpotifyConfig,
}
