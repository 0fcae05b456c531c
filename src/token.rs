//! OAuth token payload.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Token issued by a code or refresh exchange.
///
/// # Example
/// ```
/// use chrono::{Duration, Utc};
/// use hub_auth::Token;
///
/// let token = Token::new("access", Utc::now() + Duration::hours(1))
///     .with_refresh_token("refresh");
/// assert!(!token.is_expired_at(Utc::now()));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    /// Scopes the server reports as granted, if it reported any.
    pub scope: Option<String>,
    pub obtained_at: DateTime<Utc>,
}

impl Token {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            refresh_token: None,
            id_token: None,
            expires_at,
            scope: None,
            obtained_at: Utc::now(),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// True unless the token stays valid for strictly more than `buffer` after `now`.
    pub fn expires_within(&self, buffer: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= buffer
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[redacted]")
            .field("token_type", &self.token_type)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("id_token", &self.id_token.as_ref().map(|_| "[redacted]"))
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}
