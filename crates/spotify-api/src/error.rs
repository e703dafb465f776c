//! Error types for the Spotify client.

use thiserror::Error;

/// Errors raised by the Spotify client.
///
/// Messages reported by Spotify are carried unchanged so callers can surface
/// them as-is.
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// The Web API rejected the request.
    #[error("Spotify API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The accounts service rejected a token grant.
    #[error("Spotify authentication error ({status}): {message}")]
    Auth { status: u16, message: String },

    /// A grant was requested without a client id and secret.
    #[error("Spotify client credentials are not configured")]
    MissingCredentials,

    /// The response body could not be decoded.
    #[error("invalid response from Spotify: {0}")]
    InvalidResponse(String),

    /// Transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SpotifyError {
    /// HTTP status reported by Spotify, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            SpotifyError::Api { status, .. } | SpotifyError::Auth { status, .. } => Some(*status),
            SpotifyError::Http(e) => e.status().map(|s| s.as_u16()),
            SpotifyError::MissingCredentials | SpotifyError::InvalidResponse(_) => None,
        }
    }
}
