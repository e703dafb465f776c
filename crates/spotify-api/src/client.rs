//! Spotify Web API client.
//!
//! Each method maps onto exactly one Web API call. The client owns the
//! process-wide access token (see [`TokenStore`]) and attaches it to every
//! request; when no token is held the request is sent without one and Spotify
//! reports the authorization failure.

use crate::error::SpotifyError;
use crate::models::{ApiErrorBody, AuthErrorBody, PlayRequest, SearchType, TokenResponse};
use crate::token::{AccessToken, TokenStore};
use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use spotify_core::SpotifyConfig;
use std::fmt;
use std::time::Duration;

/// Spotify operations used by the MCP dispatcher.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Make sure an access token is held, granting one from the application
    /// credentials if needed. Returns `true` when a grant was attempted.
    async fn ensure_access_token(&self) -> Result<bool, SpotifyError>;

    /// `GET /v1/search`, returning the raw response body.
    async fn search(&self, kind: SearchType, query: &str, limit: u32)
        -> Result<Value, SpotifyError>;

    /// `PUT /v1/me/player/play`.
    async fn play(&self, request: &PlayRequest) -> Result<(), SpotifyError>;

    /// `PUT /v1/me/player/pause`.
    async fn pause(&self) -> Result<(), SpotifyError>;

    /// `GET /v1/me/player`. `Value::Null` when nothing is playing.
    async fn current_playback(&self) -> Result<Value, SpotifyError>;

    /// `GET /v1/me`.
    async fn current_user(&self) -> Result<Value, SpotifyError>;
}

struct AppCredentials {
    client_id: String,
    client_secret: String,
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// HTTP client for the Spotify Web API.
#[derive(Debug)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    accounts_url: String,
    credentials: Option<AppCredentials>,
    redirect_uri: Option<String>,
    tokens: TokenStore,
}

impl SpotifyClient {
    /// Build a client from configuration.
    pub fn new(config: &SpotifyConfig) -> Result<Self, SpotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        let credentials = config
            .app_credentials()
            .map(|(id, secret)| AppCredentials {
                client_id: id.to_string(),
                client_secret: secret.to_string(),
            });

        let tokens = match config.access_token.as_deref() {
            Some(token) if !token.is_empty() => TokenStore::with_token(AccessToken::user(token)),
            _ => TokenStore::new(),
        };

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            accounts_url: config.accounts_url.trim_end_matches('/').to_string(),
            credentials,
            redirect_uri: config.redirect_uri.clone(),
            tokens,
        })
    }

    /// Whether application credentials are configured.
    pub fn has_app_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Redirect URI registered for the application.
    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    /// Whether an access token is currently held.
    pub async fn has_access_token(&self) -> bool {
        self.tokens.is_present().await
    }

    /// Perform the client-credentials grant and return the token without
    /// installing it.
    pub async fn client_credentials_grant(&self) -> Result<AccessToken, SpotifyError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(SpotifyError::MissingCredentials)?;

        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_url))
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpotifyError::Auth {
                status: status.as_u16(),
                message: auth_error_message(status, &body),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SpotifyError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            client_id = %creds.client_id,
            expires_in = token.expires_in,
            "Obtained application access token"
        );

        Ok(AccessToken::application(token.access_token, token.expires_in))
    }

    /// Send a Web API request with the held token attached, turning non-2xx
    /// responses into [`SpotifyError::Api`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, SpotifyError> {
        let request = match self.tokens.bearer().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = api_error_message(status, &body);
        tracing::debug!(status = status.as_u16(), %message, "Spotify request failed");
        Err(SpotifyError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn ensure_access_token(&self) -> Result<bool, SpotifyError> {
        self.tokens
            .ensure(|| async {
                if self.credentials.is_none() {
                    tracing::debug!("No access token and no client credentials configured");
                    return Ok(None);
                }
                self.client_credentials_grant().await.map(Some)
            })
            .await
    }

    async fn search(
        &self,
        kind: SearchType,
        query: &str,
        limit: u32,
    ) -> Result<Value, SpotifyError> {
        tracing::debug!(%kind, query, limit, "Searching Spotify");
        let limit = limit.to_string();
        let request = self.http.get(self.url("/v1/search")).query(&[
            ("q", query),
            ("type", kind.as_str()),
            ("limit", limit.as_str()),
        ]);
        read_json(self.send(request).await?).await
    }

    async fn play(&self, request: &PlayRequest) -> Result<(), SpotifyError> {
        tracing::debug!(?request, "Starting playback");
        let mut put = self.http.put(self.url("/v1/me/player/play"));
        if let Some(device_id) = request.device_id.as_deref() {
            put = put.query(&[("device_id", device_id)]);
        }
        self.send(put.json(request)).await?;
        Ok(())
    }

    async fn pause(&self) -> Result<(), SpotifyError> {
        tracing::debug!("Pausing playback");
        self.send(
            self.http
                .put(self.url("/v1/me/player/pause"))
                .header(CONTENT_LENGTH, 0),
        )
        .await?;
        Ok(())
    }

    async fn current_playback(&self) -> Result<Value, SpotifyError> {
        read_json(self.send(self.http.get(self.url("/v1/me/player"))).await?).await
    }

    async fn current_user(&self) -> Result<Value, SpotifyError> {
        read_json(self.send(self.http.get(self.url("/v1/me"))).await?).await
    }
}

/// Decode a JSON body; empty bodies (e.g. 204 No Content) become `Null`.
async fn read_json(response: Response) -> Result<Value, SpotifyError> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(Value::Null);
    }
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| SpotifyError::InvalidResponse(e.to_string()))
}

fn api_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.error.message;
    }
    fallback_message(status, body)
}

fn auth_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<AuthErrorBody>(body) {
        return parsed.error_description.unwrap_or(parsed.error);
    }
    fallback_message(status, body)
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}
