//! Access-token storage and lazy bootstrap.
//!
//! The client holds a single access token for the whole process. It is
//! acquired on first need and only replaced when an application token has
//! expired; user tokens supplied through configuration are kept as-is.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::future::Future;
use tokio::sync::Mutex;

/// Tokens expiring within this margin are treated as already expired.
const EXPIRY_MARGIN_SECS: i64 = 10;

/// Where a token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOrigin {
    /// Supplied by the operator, carries user scopes.
    User,
    /// Obtained through the client-credentials grant.
    Application,
}

/// An opaque bearer credential.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    origin: TokenOrigin,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// A user token with unknown expiry.
    pub fn user(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            origin: TokenOrigin::User,
            expires_at: None,
        }
    }

    /// An application token valid for `expires_in` seconds from now.
    pub fn application(secret: impl Into<String>, expires_in: i64) -> Self {
        Self {
            secret: secret.into(),
            origin: TokenOrigin::Application,
            expires_at: Some(Utc::now() + Duration::seconds(expires_in)),
        }
    }

    pub fn origin(&self) -> TokenOrigin {
        self.origin
    }

    /// Whether the token can still be sent at `now`.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now + Duration::seconds(EXPIRY_MARGIN_SECS) < expires_at,
            None => true,
        }
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("origin", &self.origin)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Single-owner cell for the process-wide access token.
#[derive(Debug, Default)]
pub struct TokenStore {
    slot: Mutex<Option<AccessToken>>,
}

impl TokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a token.
    pub fn with_token(token: AccessToken) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }

    /// Ensure a usable token is held.
    ///
    /// When the slot is empty (or holds an expired token), `grant` is awaited
    /// under the lock and its token, if any, is installed. A grant returning
    /// `None` leaves the store empty. Returns `true` when `grant` ran.
    pub async fn ensure<F, Fut, E>(&self, grant: F) -> Result<bool, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<AccessToken>, E>>,
    {
        let mut slot = self.slot.lock().await;
        if slot.as_ref().is_some_and(|t| t.is_usable_at(Utc::now())) {
            return Ok(false);
        }

        if let Some(stale) = slot.as_ref() {
            tracing::debug!(origin = ?stale.origin(), "Access token expired");
        }

        if let Some(token) = grant().await? {
            *slot = Some(token);
        }
        Ok(true)
    }

    /// Whether any token is held, expired or not.
    pub async fn is_present(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// The held token's secret, for an `Authorization: Bearer` header.
    pub(crate) async fn bearer(&self) -> Option<String> {
        self.slot
            .lock()
            .await
            .as_ref()
            .map(|t| t.secret().to_string())
    }
}
