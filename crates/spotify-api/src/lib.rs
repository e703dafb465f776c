//! # spotify-api
//!
//! A small Spotify Web API client covering the calls the MCP server exposes:
//! search, playback start/pause, the current playback state and the current
//! user profile.
//!
//! The client also owns the process-wide access token. Call
//! [`SpotifyApi::ensure_access_token`] before any request: it is a no-op when a
//! token is held, and otherwise falls back to the client-credentials grant
//! when an application id and secret are configured.
//!
//! ```ignore
//! use spotify_api::{SearchType, SpotifyApi, SpotifyClient};
//! use spotify_core::SpotifyConfig;
//!
//! let client = SpotifyClient::new(&SpotifyConfig::default())?;
//! client.ensure_access_token().await?;
//! let body = client.search(SearchType::Track, "daft punk", 10).await?;
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod token;

pub use client::{SpotifyApi, SpotifyClient};
pub use error::SpotifyError;
pub use models::{PlayRequest, SearchType, TokenResponse};
pub use token::{AccessToken, TokenOrigin, TokenStore};
