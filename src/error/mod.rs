//! Error types for hub-auth.

use thiserror::Error;

/// Errors produced by the token lifecycle engine.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Token exchange failed: {}", describe_exchange_failure(.status, .error, .description))]
    TokenExchangeFailed {
        status: Option<u16>,
        error: Option<String>,
        description: Option<String>,
    },

    #[error("OAuth state mismatch")]
    InvalidState,

    #[error("Sign-in cancelled by user")]
    UserCancelled,

    #[error("Authorization denied: {error}")]
    AuthorizationDenied {
        error: String,
        description: Option<String>,
    },

    #[error("Redirect is missing the authorization code")]
    MissingAuthorizationCode,

    #[error("Invalid redirect: {0}")]
    InvalidRedirect(String),

    #[error("A sign-in is already in progress")]
    SignInInProgress,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Secure random source unavailable: {0}")]
    Randomness(String),
}

impl AuthError {
    pub(crate) fn exchange_failed(
        status: Option<u16>,
        error: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self::TokenExchangeFailed {
            status,
            error,
            description,
        }
    }

    /// Whether the caller's only way forward is a fresh sign-in.
    pub fn is_reauthentication_required(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }

    /// The OAuth `error` code reported by the server, if any.
    pub fn server_error_code(&self) -> Option<&str> {
        match self {
            Self::TokenExchangeFailed { error, .. } => error.as_deref(),
            Self::AuthorizationDenied { error, .. } => Some(error),
            _ => None,
        }
    }
}

fn describe_exchange_failure(
    status: &Option<u16>,
    error: &Option<String>,
    description: &Option<String>,
) -> String {
    let mut out = match error {
        Some(code) => code.clone(),
        None => "unexpected response".to_string(),
    };
    if let Some(description) = description {
        out.push_str(": ");
        out.push_str(description);
    }
    if let Some(status) = status {
        out.push_str(&format!(" (status {status})"));
    }
    out
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Storage(format!("serialization failed: {error}"))
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Storage(format!("serialization failed: {error}"))
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Storage(format!("serialization failed: {error}"))
    }
}

#[cfg(feature = "keyring")]
impl From<keyring::Error> for AuthError {
    fn from(error: keyring::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AuthError>;
