//! Request and response shapes for the Spotify Web API calls used here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Item kind for `/v1/search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Track,
    Artist,
    Album,
}

impl SearchType {
    pub const ALL: [SearchType; 3] = [SearchType::Track, SearchType::Artist, SearchType::Album];

    /// Value of the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Track => "track",
            SearchType::Artist => "artist",
            SearchType::Album => "album",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unsupported search type: {}", s))
    }
}

/// Arguments of `PUT /v1/me/player/play`.
///
/// Serializes to the request body: absent fields are omitted, and fields
/// without a typed counterpart (`offset`, ...) are passed through as given.
/// `device_id` travels in the query string instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uris: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_ms: Option<serde_json::Number>,
    #[serde(default, skip_serializing)]
    pub device_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Successful response of the accounts token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// Web API error body: `{"error": {"status": 401, "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub message: String,
}

/// Accounts error body: `{"error": "invalid_client", "error_description": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}
