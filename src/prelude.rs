//! Convenience re-exports for common use.

pub use crate::client::OAuthClient;
pub use crate::config::{OAuthConfig, StoreConfig};
pub use crate::error::{AuthError, Result};
pub use crate::manager::AuthManager;
pub use crate::pkce::PkceChallenge;
pub use crate::scope::{Scope, ScopePreset, ScopeSet};
pub use crate::store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use crate::token::Token;
pub use crate::user_agent::{ConsoleUserAgent, UserAgent, UserAgentOutcome};
