//! Spotify client configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials and endpoints for the Spotify Web API.
#[derive(Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    /// Application client id.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Application client secret.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Redirect URI registered for the application.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Pre-acquired user access token. Required for playback control, which
    /// the application grant cannot authorize.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Web API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Accounts service base URL (token endpoint).
    #[serde(default = "default_accounts_url")]
    pub accounts_url: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            access_token: None,
            api_url: default_api_url(),
            accounts_url: default_accounts_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SpotifyConfig {
    /// Client id and secret, when both are set and non-empty.
    pub fn app_credentials(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id, secret))
            }
            _ => None,
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("accounts_url", &self.accounts_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_api_url() -> String {
    "https://api.spotify.com".to_string()
}

fn default_accounts_url() -> String {
    "https://accounts.spotify.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
