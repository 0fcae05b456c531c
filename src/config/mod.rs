//! Client configuration and storage identifiers.

use bon::bon;
use url::Url;

use crate::error::{AuthError, Result};
use crate::scope::ScopeSet;

/// Production authorization server.
pub const DEFAULT_BASE_URL: &str = "https://huggingface.co";

pub const ENV_CLIENT_ID: &str = "HUB_AUTH_CLIENT_ID";
pub const ENV_REDIRECT_URL: &str = "HUB_AUTH_REDIRECT_URL";
pub const ENV_BASE_URL: &str = "HUB_AUTH_BASE_URL";
pub const ENV_SCOPES: &str = "HUB_AUTH_SCOPES";

const AUTHORIZE_PATH: [&str; 2] = ["oauth", "authorize"];
const TOKEN_PATH: [&str; 2] = ["oauth", "token"];

/// Immutable OAuth client configuration.
///
/// # Example
/// ```
/// use hub_auth::config::OAuthConfig;
/// use hub_auth::scope::ScopeSet;
///
/// let config = OAuthConfig::builder()
///     .client_id("my-client")
///     .redirect_url("myapp://oauth/callback")
///     .scopes(ScopeSet::read_access())
///     .build()?;
/// assert_eq!(config.base_url().as_str(), "https://huggingface.co/");
/// # Ok::<(), hub_auth::AuthError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    client_id: String,
    redirect_url: Url,
    base_url: Url,
    scopes: ScopeSet,
}

#[bon]
impl OAuthConfig {
    /// Validate and build a configuration.
    ///
    /// The base URL must be `https` (plain `http` only for loopback hosts).
    /// The redirect URL may additionally use an app-custom scheme.
    #[builder]
    pub fn new(
        #[builder(into)] client_id: String,
        #[builder(into)] redirect_url: String,
        #[builder(into)] base_url: Option<String>,
        #[builder(default = ScopeSet::basic())] scopes: ScopeSet,
    ) -> Result<Self> {
        let client_id = client_id.trim().to_string();
        if client_id.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "client id must not be empty".to_string(),
            ));
        }

        let base_url = parse_url("base URL", base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        if !is_secure_http(&base_url) {
            return Err(AuthError::InvalidConfiguration(format!(
                "base URL must use https: {base_url}"
            )));
        }

        let redirect_url = parse_url("redirect URL", &redirect_url)?;
        if is_web_scheme(&redirect_url) && !is_secure_http(&redirect_url) {
            return Err(AuthError::InvalidConfiguration(format!(
                "redirect URL must use https, a loopback address, or an app scheme: {redirect_url}"
            )));
        }

        let config = Self {
            client_id,
            redirect_url,
            base_url,
            scopes,
        };
        config.authorization_endpoint()?;
        config.token_endpoint()?;
        Ok(config)
    }

    /// Load configuration from the process environment (and `.env` if present).
    ///
    /// Intended for binaries; the library itself never consults the environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // .env is optional
        let client_id = required_env(ENV_CLIENT_ID)?;
        let redirect_url = required_env(ENV_REDIRECT_URL)?;
        let scopes = match std::env::var(ENV_SCOPES) {
            Ok(raw) if !raw.trim().is_empty() => raw.parse::<ScopeSet>()?,
            _ => ScopeSet::basic(),
        };
        Self::builder()
            .client_id(client_id)
            .redirect_url(redirect_url)
            .maybe_base_url(std::env::var(ENV_BASE_URL).ok())
            .scopes(scopes)
            .build()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_url(&self) -> &Url {
        &self.redirect_url
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    /// Same configuration with a different scope set.
    pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn authorization_endpoint(&self) -> Result<Url> {
        endpoint(&self.base_url, &AUTHORIZE_PATH)
    }

    pub fn token_endpoint(&self) -> Result<Url> {
        endpoint(&self.base_url, &TOKEN_PATH)
    }
}

/// Identifiers the default stores key the persisted token by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub service: String,
    pub account: String,
}

impl StoreConfig {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("hub-auth", "default")
    }
}

fn parse_url(label: &str, raw: &str) -> Result<Url> {
    Url::parse(raw.trim())
        .map_err(|err| AuthError::InvalidConfiguration(format!("invalid {label} `{raw}`: {err}")))
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| AuthError::InvalidConfiguration(format!("{name} is not set")))
}

fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn is_secure_http(url: &Url) -> bool {
    match url.scheme() {
        "https" => url.host().is_some(),
        "http" => is_loopback(url),
        _ => false,
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
        Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}

fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| {
            AuthError::InvalidConfiguration(format!("base URL cannot carry a path: {base}"))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
