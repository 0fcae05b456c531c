//! Sign-in orchestration and token lifecycle.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use crate::client::OAuthClient;
use crate::config::{OAuthConfig, StoreConfig};
use crate::error::{AuthError, Result};
use crate::pkce::{self, PkceChallenge};
use crate::store::{self, TokenStore};
use crate::token::Token;
use crate::user_agent::{ConsoleUserAgent, UserAgent, UserAgentOutcome};

/// Tokens closer than this to expiry are refreshed before being handed out.
pub const REFRESH_BUFFER_MINUTES: i64 = 5;

/// Owns the signed-in session: the current token, its persistence, and
/// when to refresh it.
///
/// All token mutations are serialized. Concurrent [`get_valid_token`] calls
/// that find a stale token share a single refresh exchange: the first caller
/// refreshes, the rest wait on the same gate and then reuse its result.
/// Only one [`sign_in`] may run at a time; a second concurrent call fails
/// with [`AuthError::SignInInProgress`].
///
/// [`get_valid_token`]: AuthManager::get_valid_token
/// [`sign_in`]: AuthManager::sign_in
///
/// # Example
/// ```no_run
/// use hub_auth::config::{OAuthConfig, StoreConfig};
/// use hub_auth::manager::AuthManager;
/// use hub_auth::scope::ScopeSet;
///
/// # async fn run() -> hub_auth::Result<()> {
/// let config = OAuthConfig::builder()
///     .client_id("my-client")
///     .redirect_url("myapp://oauth/callback")
///     .scopes(ScopeSet::read_access())
///     .build()?;
/// let manager = AuthManager::with_defaults(config, &StoreConfig::default())?;
/// if !manager.is_authenticated().await {
///     manager.sign_in().await?;
/// }
/// let access_token = manager.get_valid_token().await?;
/// # let _ = access_token;
/// # Ok(())
/// # }
/// ```
pub struct AuthManager {
    client: OAuthClient,
    store: Arc<dyn TokenStore>,
    user_agent: Arc<dyn UserAgent>,
    token: RwLock<Option<Token>>,
    refresh_gate: Mutex<()>,
    sign_in_gate: Mutex<()>,
}

impl AuthManager {
    /// Create a manager, restoring any previously persisted token.
    pub fn new(
        client: OAuthClient,
        store: Arc<dyn TokenStore>,
        user_agent: Arc<dyn UserAgent>,
    ) -> Result<Self> {
        let restored = store.retrieve()?;
        debug!(restored = restored.is_some(), "auth manager initialized");
        Ok(Self {
            client,
            store,
            user_agent,
            token: RwLock::new(restored),
            refresh_gate: Mutex::new(()),
            sign_in_gate: Mutex::new(()),
        })
    }

    /// Manager with the platform credential store, `reqwest` transport and
    /// the console user agent.
    pub fn with_defaults(config: OAuthConfig, store_config: &StoreConfig) -> Result<Self> {
        Self::new(
            OAuthClient::new(config),
            store::default_store(store_config)?,
            Arc::new(ConsoleUserAgent::new()),
        )
    }

    /// The protocol client this manager exchanges tokens through.
    pub fn client(&self) -> &OAuthClient {
        &self.client
    }

    /// True iff a token is held in memory; it may still be expired.
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Snapshot of the held token, without any validity check.
    pub async fn current_token(&self) -> Option<Token> {
        self.token.read().await.clone()
    }

    /// Run the interactive authorization-code + PKCE flow.
    ///
    /// Any failure (cancellation, state mismatch, rejected exchange) leaves
    /// the previously held token untouched. Dropping the returned future
    /// abandons the attempt with the same guarantee.
    pub async fn sign_in(&self) -> Result<()> {
        let _attempt = self
            .sign_in_gate
            .try_lock()
            .map_err(|_| AuthError::SignInInProgress)?;

        let pkce = PkceChallenge::generate()?;
        let state = pkce::generate_state()?;
        let config = self.client.config();
        let authorization_url =
            self.client
                .authorization_url(&pkce.challenge, &state, config.scopes())?;

        info!(scopes = %config.scopes(), "starting sign-in");
        let redirect = match self
            .user_agent
            .authorize(&authorization_url, config.redirect_url())
            .await?
        {
            UserAgentOutcome::Redirect(url) => url,
            UserAgentOutcome::Cancelled => {
                info!("sign-in cancelled by user");
                return Err(AuthError::UserCancelled);
            }
        };

        let code = authorization_code(&redirect, config.redirect_url(), &state)?;
        let token = self.client.exchange_code(&code, &pkce.verifier).await?;

        // Any in-flight refresh finishes first, so the new session is installed last.
        let _gate = self.refresh_gate.lock().await;
        self.install(token).await?;
        info!("signed in");
        Ok(())
    }

    /// Access token valid for at least the refresh buffer, refreshing if needed.
    ///
    /// A rejected refresh, or an expired token with nothing to refresh it
    /// with, ends the session and yields [`AuthError::AuthenticationRequired`].
    /// Transport failures are returned as-is and keep the session.
    pub async fn get_valid_token(&self) -> Result<String> {
        {
            let current = self.token.read().await;
            match current.as_ref() {
                None => return Err(AuthError::AuthenticationRequired),
                Some(token) if !token.expires_within(refresh_buffer(), Utc::now()) => {
                    return Ok(token.access_token.clone());
                }
                Some(_) => {}
            }
        }
        self.refresh_if_stale(None).await
    }

    /// Refresh now regardless of expiry, e.g. after the API rejected the token.
    ///
    /// Callers that queued behind an in-flight refresh reuse its result.
    pub async fn force_refresh(&self) -> Result<String> {
        let seen = self
            .token
            .read()
            .await
            .as_ref()
            .map(|token| token.obtained_at)
            .ok_or(AuthError::AuthenticationRequired)?;
        self.refresh_if_stale(Some(seen)).await
    }

    /// Forget the session in memory and in storage. Never fails; a storage
    /// error is logged and the in-memory state is cleared regardless.
    pub async fn sign_out(&self) {
        let _gate = self.refresh_gate.lock().await;
        self.discard().await;
        info!("signed out");
    }

    /// `forced` carries the `obtained_at` of the token the caller saw before
    /// queuing; any newer token counts as already refreshed.
    async fn refresh_if_stale(&self, forced: Option<DateTime<Utc>>) -> Result<String> {
        let _gate = self.refresh_gate.lock().await;

        // Re-check under the gate: another caller may have refreshed already.
        let Some(current) = self.token.read().await.clone() else {
            return Err(AuthError::AuthenticationRequired);
        };
        let stale = match &forced {
            Some(seen) => *seen == current.obtained_at,
            None => current.expires_within(refresh_buffer(), Utc::now()),
        };
        if !stale {
            debug!("token already refreshed by a concurrent caller");
            return Ok(current.access_token);
        }

        let Some(refresh_token) = current.refresh_token.clone() else {
            if forced.is_none() && !current.is_expired_at(Utc::now()) {
                return Ok(current.access_token);
            }
            info!("token unusable and no refresh token held");
            self.discard().await;
            return Err(AuthError::AuthenticationRequired);
        };

        match self.client.refresh(&refresh_token).await {
            Ok(token) => {
                let access_token = token.access_token.clone();
                self.install(token).await?;
                Ok(access_token)
            }
            Err(err @ AuthError::Network(_)) => Err(err),
            Err(err) => {
                warn!(error = %err, "refresh rejected, ending session");
                self.discard().await;
                Err(AuthError::AuthenticationRequired)
            }
        }
    }

    /// Caller must hold `refresh_gate`.
    async fn install(&self, token: Token) -> Result<()> {
        *self.token.write().await = Some(token.clone());
        self.store.store(&token)
    }

    /// Caller must hold `refresh_gate`.
    async fn discard(&self) {
        if let Err(err) = self.store.delete() {
            warn!(error = %err, "failed to delete persisted token");
        }
        *self.token.write().await = None;
    }
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

fn refresh_buffer() -> Duration {
    Duration::minutes(REFRESH_BUFFER_MINUTES)
}

/// Validate a redirect against this attempt and pull out the code.
fn authorization_code(redirect: &Url, expected: &Url, state: &str) -> Result<String> {
    if !same_endpoint(redirect, expected) {
        return Err(AuthError::InvalidRedirect(format!(
            "redirect does not target {expected}"
        )));
    }

    let mut code = None;
    let mut returned_state = None;
    let mut error = None;
    let mut error_description = None;
    for (key, value) in redirect.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => returned_state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        warn!(error = %error, "authorization server returned an error");
        return Err(AuthError::AuthorizationDenied {
            error,
            description: error_description,
        });
    }
    match returned_state {
        Some(returned) if constant_time_eq(returned.as_bytes(), state.as_bytes()) => {}
        _ => {
            warn!("redirect state does not match this sign-in attempt");
            return Err(AuthError::InvalidState);
        }
    }
    code.filter(|code| !code.is_empty())
        .ok_or(AuthError::MissingAuthorizationCode)
}

fn same_endpoint(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
        && a.path() == b.path()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
