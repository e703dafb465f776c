use anyhow::Context;
use clap::Parser;
use spotify_api::SpotifyClient;
use spotify_mcp::{HttpServer, McpServer, serve_stdio};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod config;

use config::ServerArgs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    // Stdout carries the stdio transport, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if dotenv_loaded {
        tracing::debug!("Loaded environment from .env file");
    }

    let config = ServerArgs::parse().into_config();
    tracing::debug!(?config, "Resolved configuration");

    let client = SpotifyClient::new(&config.spotify).context("Failed to build Spotify client")?;
    if client.has_app_credentials() {
        tracing::info!(
            redirect_uri = client.redirect_uri().unwrap_or("<unset>"),
            "Using Spotify application credentials"
        );
    } else if !client.has_access_token().await {
        tracing::warn!(
            "Neither SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET nor SPOTIFY_ACCESS_TOKEN is set; \
             Spotify calls will be rejected"
        );
    }

    let server = Arc::new(McpServer::new(config.mcp, Arc::new(client)));
    let http = HttpServer::new(Arc::clone(&server)).context("Invalid HTTP configuration")?;

    tokio::spawn({
        let server = Arc::clone(&server);
        async move {
            if let Err(e) = serve_stdio(&server).await {
                tracing::error!(error = %e, "Stdio transport failed");
            }
        }
    });

    tokio::select! {
        result = http.run() => {
            result.context("HTTP transport failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C, shutting down");
        }
    }

    Ok(())
}
