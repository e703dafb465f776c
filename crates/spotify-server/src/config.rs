//! Command-line and environment configuration.
//!
//! Every setting can be given as a `--flag` or through the environment
//! variable named next to it; flags win. A `.env` file in the working
//! directory is loaded before parsing.

use clap::Parser;
use spotify_core::{McpConfig, ServerConfig, SpotifyConfig};

#[derive(Parser, Debug)]
#[command(
    name = "spotify-mcp-server",
    version,
    about = "MCP server for the Spotify Web API (stdio and HTTP/SSE)"
)]
pub struct ServerArgs {
    /// Server name reported to clients.
    #[arg(long, env = "MCP_SERVER_NAME", default_value = "spotify-mcp-server")]
    pub name: String,

    /// Interface the HTTP listener binds to.
    #[arg(long, env = "MCP_SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP listener port.
    #[arg(long, env = "MCP_SERVER_PORT", default_value_t = 7312)]
    pub port: u16,

    /// Path of the SSE endpoint.
    #[arg(long, env = "MCP_SSE_PATH", default_value = "/sse")]
    pub sse_path: String,

    /// Path SSE clients POST messages to.
    #[arg(long, env = "MCP_MESSAGES_PATH", default_value = "/messages")]
    pub messages_path: String,

    /// Spotify application client id.
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Spotify application client secret.
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Redirect URI registered for the application.
    #[arg(long, env = "SPOTIFY_REDIRECT_URI")]
    pub redirect_uri: Option<String>,

    /// Pre-acquired user access token (needed for playback control).
    #[arg(long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Spotify Web API base URL.
    #[arg(long, env = "SPOTIFY_API_URL", default_value = "https://api.spotify.com")]
    pub api_url: String,

    /// Spotify accounts service base URL.
    #[arg(
        long,
        env = "SPOTIFY_ACCOUNTS_URL",
        default_value = "https://accounts.spotify.com"
    )]
    pub accounts_url: String,

    /// Timeout for Spotify requests, in seconds.
    #[arg(long, env = "SPOTIFY_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl ServerArgs {
    /// Build the server configuration.
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            mcp: McpConfig {
                name: self.name,
                host: self.host,
                port: self.port,
                sse_path: self.sse_path,
                messages_path: self.messages_path,
            },
            spotify: SpotifyConfig {
                client_id: self.client_id,
                client_secret: self.client_secret,
                redirect_uri: self.redirect_uri,
                access_token: self.access_token,
                api_url: self.api_url,
                accounts_url: self.accounts_url,
                timeout_secs: self.timeout_secs,
            },
        }
    }
}
