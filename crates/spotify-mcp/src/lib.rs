//! # spotify-mcp
//!
//! MCP (Model Context Protocol) server exposing a small slice of the Spotify
//! Web API to AI agents.
//!
//! The same dispatcher serves two transports at once:
//!
//! - **stdio**: newline-delimited JSON-RPC on stdin/stdout
//! - **HTTP/SSE**: an event stream on `GET {sse_path}` plus a message endpoint
//!
//! ## Architecture
//!
//! ```text
//! AI Agent (Claude, GPT, etc.)
//!       │
//!       │ MCP protocol (tools / resources)
//!       ▼
//! ┌──────────────────────┐
//! │  Spotify MCP Server  │
//! │  1. Ensure token     │  ← client credentials or user token
//! │  2. Validate args    │  ← declared input schemas
//! │  3. Call Web API     │  ← spotify-api
//! │  4. Return JSON/text │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!     api.spotify.com
//! ```
//!
//! ## Tools and resources
//!
//! | Name | Kind | Description |
//! |------|------|-------------|
//! | `spotify.search` | tool | Search tracks, artists or albums |
//! | `spotify.play` | tool | Start or resume playback |
//! | `spotify.pause` | tool | Pause playback |
//! | `spotify:currently-playing` | resource | Current playback state |
//! | `spotify:user-profile` | resource | Current user profile |
//!
//! ## Example Usage
//!
//! ```ignore
//! use spotify_api::SpotifyClient;
//! use spotify_core::ServerConfig;
//! use spotify_mcp::{HttpServer, McpServer, serve_stdio};
//! use std::sync::Arc;
//!
//! let config = ServerConfig::default();
//! let client = SpotifyClient::new(&config.spotify)?;
//! let server = Arc::new(McpServer::new(config.mcp, Arc::new(client)));
//!
//! tokio::spawn({
//!     let server = Arc::clone(&server);
//!     async move { serve_stdio(&server).await }
//! });
//! HttpServer::new(server)?.run().await?;
//! ```

pub mod error;
pub mod http_transport;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod stdio;
pub mod tools;

// Re-export main types
pub use error::McpError;
pub use http_transport::{HttpServer, HttpState, ServiceInfo, SseTransport, create_router};
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ReadResourceResponse,
    ResourceDefinition, ToolContent, ToolDefinition,
};
pub use resources::{ResourceRegistry, SpotifyResource};
pub use server::McpServer;
pub use stdio::{serve_lines, serve_stdio};
pub use tools::{SpotifyTool, ToolCall, ToolRegistry};
