#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use hub_auth::client::OAuthClient;
use hub_auth::config::OAuthConfig;
use hub_auth::manager::AuthManager;
use hub_auth::scope::ScopeSet;
use hub_auth::store::{MemoryTokenStore, TokenStore};
use hub_auth::transport::{HttpTransport, TransportResponse};
use hub_auth::user_agent::{UserAgent, UserAgentOutcome};
use hub_auth::{AuthError, Token};
use tokio::sync::Notify;
use url::Url;

pub const REDIRECT_URL: &str = "myapp://oauth/callback";
pub const CLIENT_ID: &str = "test-client";

pub fn config_for(server_uri: &str, scopes: ScopeSet) -> OAuthConfig {
    OAuthConfig::builder()
        .client_id(CLIENT_ID)
        .redirect_url(REDIRECT_URL)
        .base_url(server_uri)
        .scopes(scopes)
        .build()
        .expect("test config should be valid")
}

pub fn client_for(server_uri: &str) -> OAuthClient {
    OAuthClient::new(config_for(server_uri, ScopeSet::basic()))
}

pub fn manager_for(
    client: OAuthClient,
    store: Arc<dyn TokenStore>,
    user_agent: Arc<dyn UserAgent>,
) -> AuthManager {
    AuthManager::new(client, store, user_agent).expect("manager should initialize")
}

pub fn token_expiring_in(access: &str, minutes: i64) -> Token {
    Token::new(access, Utc::now() + Duration::minutes(minutes))
}

pub fn seeded_store(token: Token) -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_token(token))
}

// ---------------------------------------------------------------------------
// User agent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Behavior {
    /// Redirect with `code` and the state from the authorization URL.
    Approve(String),
    /// Redirect with `code` but a state from some other attempt.
    WrongState,
    /// Report the user closing the login.
    Cancel,
    /// Redirect carrying `error=access_denied`.
    Deny,
    /// Redirect with the correct state and no code.
    MissingCode,
}

/// Scripted user agent that records every authorization URL it was shown.
pub struct FakeUserAgent {
    behavior: Behavior,
    seen: Mutex<Vec<Url>>,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl FakeUserAgent {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            seen: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn approving(code: &str) -> Self {
        Self::new(Behavior::Approve(code.to_string()))
    }

    /// Signal `entered` once shown the URL, then hold until `release` fires.
    pub fn held(behavior: Behavior, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        Self {
            gate: Some((entered, release)),
            ..Self::new(behavior)
        }
    }

    pub fn seen_urls(&self) -> Vec<Url> {
        self.seen.lock().expect("user agent lock poisoned").clone()
    }

    pub fn last_param(&self, name: &str) -> Option<String> {
        self.seen_urls().last().and_then(|url| query_param(url, name))
    }
}

pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

#[async_trait]
impl UserAgent for FakeUserAgent {
    async fn authorize(
        &self,
        authorization_url: &Url,
        redirect_url: &Url,
    ) -> Result<UserAgentOutcome, AuthError> {
        self.seen
            .lock()
            .expect("user agent lock poisoned")
            .push(authorization_url.clone());
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }

        let state = query_param(authorization_url, "state").unwrap_or_default();
        let mut redirect = redirect_url.clone();
        match &self.behavior {
            Behavior::Approve(code) => {
                redirect
                    .query_pairs_mut()
                    .append_pair("code", code)
                    .append_pair("state", &state);
            }
            Behavior::WrongState => {
                redirect
                    .query_pairs_mut()
                    .append_pair("code", "stolen-code")
                    .append_pair("state", "attacker-state");
            }
            Behavior::Cancel => return Ok(UserAgentOutcome::Cancelled),
            Behavior::Deny => {
                redirect
                    .query_pairs_mut()
                    .append_pair("error", "access_denied")
                    .append_pair("error_description", "The user denied access")
                    .append_pair("state", &state);
            }
            Behavior::MissingCode => {
                redirect.query_pairs_mut().append_pair("state", &state);
            }
        }
        Ok(UserAgentOutcome::Redirect(redirect))
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Memory store whose writes and deletes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryTokenStore,
    fail_store: AtomicBool,
    fail_delete: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: Token) -> Self {
        Self {
            inner: MemoryTokenStore::with_token(token),
            ..Self::default()
        }
    }

    pub fn fail_store(&self, fail: bool) {
        self.fail_store.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }
}

impl TokenStore for FlakyStore {
    fn store(&self, token: &Token) -> Result<(), AuthError> {
        if self.fail_store.load(Ordering::SeqCst) {
            return Err(AuthError::Storage("disk full".to_string()));
        }
        self.inner.store(token)
    }

    fn retrieve(&self) -> Result<Option<Token>, AuthError> {
        self.inner.retrieve()
    }

    fn delete(&self) -> Result<(), AuthError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AuthError::Storage("keychain locked".to_string()));
        }
        self.inner.delete()
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Transport that never reaches the server.
#[derive(Default)]
pub struct OfflineTransport {
    calls: AtomicUsize,
}

impl OfflineTransport {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for OfflineTransport {
    async fn post_form(
        &self,
        _url: &Url,
        _form: &[(&str, &str)],
    ) -> Result<TransportResponse, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AuthError::Network("connection refused".to_string()))
    }
}
