//! Stateless OAuth protocol logic: authorization URL, code exchange, refresh.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::OAuthConfig;
use crate::error::{AuthError, Result};
use crate::pkce::CHALLENGE_METHOD;
use crate::scope::ScopeSet;
use crate::token::Token;
use crate::transport::{HttpTransport, ReqwestTransport, TransportResponse};

/// OAuth 2.0 authorization-code + PKCE client.
///
/// Holds nothing but its configuration and transport, so it can be shared
/// freely between tasks.
///
/// # Example
/// ```
/// use hub_auth::client::OAuthClient;
/// use hub_auth::config::OAuthConfig;
///
/// let config = OAuthConfig::builder()
///     .client_id("my-client")
///     .redirect_url("myapp://callback")
///     .build()?;
/// let client = OAuthClient::new(config);
/// let url = client.authorization_url("challenge", "state", client.config().scopes())?;
/// assert!(url.as_str().starts_with("https://huggingface.co/oauth/authorize?"));
/// # Ok::<(), hub_auth::AuthError>(())
/// ```
#[derive(Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    transport: Arc<dyn HttpTransport>,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(config: OAuthConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorization endpoint URL the user agent should open.
    pub fn authorization_url(&self, challenge: &str, state: &str, scopes: &ScopeSet) -> Result<Url> {
        let mut url = self.config.authorization_endpoint()?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", self.config.client_id())
            .append_pair("redirect_uri", self.config.redirect_url().as_str())
            .append_pair("scope", &scopes.to_string())
            .append_pair("state", state)
            .append_pair("code_challenge", challenge)
            .append_pair("code_challenge_method", CHALLENGE_METHOD);
        Ok(url)
    }

    /// Exchange an authorization code (plus the PKCE verifier) for a token.
    pub async fn exchange_code(&self, code: &str, verifier: &str) -> Result<Token> {
        debug!("exchanging authorization code");
        let token = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_url().as_str()),
                ("client_id", self.config.client_id()),
                ("code_verifier", verifier),
            ])
            .await?;
        debug!(expires_at = %token.expires_at, "authorization code exchanged");
        Ok(token)
    }

    /// Exchange a refresh token for a new token.
    ///
    /// When the server does not rotate the refresh token, the one passed in is
    /// carried over to the returned token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token> {
        debug!("refreshing access token");
        let mut token = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id()),
            ])
            .await?;
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }
        debug!(expires_at = %token.expires_at, "access token refreshed");
        Ok(token)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<Token> {
        let url = self.config.token_endpoint()?;
        let response = self.transport.post_form(&url, form).await?;
        token_from_response(response, Utc::now())
    }
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: Option<String>,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    id_token: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

fn token_from_response(response: TransportResponse, received_at: DateTime<Utc>) -> Result<Token> {
    let status = response.status;
    if !response.is_success() {
        let failure = server_failure(status, &response.body);
        warn!(status, error = ?failure.server_error_code(), "token endpoint rejected request");
        return Err(failure);
    }

    let payload: TokenResponse = match serde_json::from_str(&response.body) {
        Ok(payload) => payload,
        // Some servers answer 200 with an OAuth error object.
        Err(err) => {
            return Err(match serde_json::from_str::<TokenErrorResponse>(&response.body) {
                Ok(body) => AuthError::exchange_failed(
                    Some(status),
                    Some(body.error),
                    body.error_description,
                ),
                Err(_) => AuthError::exchange_failed(
                    Some(status),
                    None,
                    Some(format!("malformed token response: {err}")),
                ),
            });
        }
    };

    if payload.access_token.is_empty() {
        return Err(AuthError::exchange_failed(
            Some(status),
            None,
            Some("token response has an empty access_token".to_string()),
        ));
    }
    let expires_in = payload.expires_in.ok_or_else(|| {
        AuthError::exchange_failed(
            Some(status),
            None,
            Some("token response is missing expires_in".to_string()),
        )
    })?;
    let expires_at = (expires_in >= 0)
        .then(|| Duration::try_seconds(expires_in))
        .flatten()
        .and_then(|lifetime| received_at.checked_add_signed(lifetime))
        .ok_or_else(|| {
            AuthError::exchange_failed(
                Some(status),
                None,
                Some(format!("expires_in out of range: {expires_in}")),
            )
        })?;

    Ok(Token {
        access_token: payload.access_token,
        token_type: payload.token_type.unwrap_or_else(|| "Bearer".to_string()),
        refresh_token: payload.refresh_token,
        id_token: payload.id_token,
        expires_at,
        scope: payload.scope,
        obtained_at: received_at,
    })
}

fn server_failure(status: u16, body: &str) -> AuthError {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(body) => AuthError::exchange_failed(Some(status), Some(body.error), body.error_description),
        Err(_) => AuthError::exchange_failed(Some(status), None, None),
    }
}
