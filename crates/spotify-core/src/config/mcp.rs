//! MCP server configuration.
//!
//! Both transports (stdio and HTTP/SSE) are always started; this section only
//! controls the server identity and where the HTTP listener binds.

use serde::{Deserialize, Serialize};

/// Configuration for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Server name reported in `initialize` and on `GET /`.
    #[serde(default = "default_name")]
    pub name: String,

    /// HTTP host to bind.
    #[serde(default = "default_http_host")]
    pub host: String,

    /// HTTP port.
    #[serde(default = "default_http_port")]
    pub port: u16,

    /// Path of the event-stream endpoint.
    #[serde(default = "default_sse_path")]
    pub sse_path: String,

    /// Path SSE clients POST their JSON-RPC messages to.
    #[serde(default = "default_messages_path")]
    pub messages_path: String,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            host: default_http_host(),
            port: default_http_port(),
            sse_path: default_sse_path(),
            messages_path: default_messages_path(),
        }
    }
}

impl McpConfig {
    /// Address the HTTP listener binds to, e.g. `0.0.0.0:7312`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL logged at startup for SSE clients.
    pub fn sse_url(&self) -> String {
        format!("http://localhost:{}{}", self.port, self.sse_path)
    }
}

fn default_name() -> String {
    "spotify-mcp-server".to_string()
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    7312
}

fn default_sse_path() -> String {
    "/sse".to_string()
}

fn default_messages_path() -> String {
    "/messages".to_string()
}
