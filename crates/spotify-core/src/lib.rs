//! Configuration types shared across the Spotify MCP crates.

pub mod config;

pub use config::{McpConfig, ServerConfig, SpotifyConfig};
