//! hub-auth: OAuth 2.0 authorization-code + PKCE sign-in for native apps.
//!
//! Generates PKCE material, drives the interactive authorization step
//! through a pluggable user agent, exchanges and refreshes tokens against
//! the authorization server, and persists the session in a credential store.
//!
//! # Quick Start
//!
//! ```no_run
//! use hub_auth::prelude::*;
//!
//! # async fn example() -> hub_auth::Result<()> {
//! let config = OAuthConfig::builder()
//!     .client_id("my-client")
//!     .redirect_url("myapp://oauth/callback")
//!     .scopes(ScopeSet::read_access())
//!     .build()?;
//! let manager = AuthManager::with_defaults(config, &StoreConfig::default())?;
//! manager.sign_in().await?;
//! let bearer = manager.get_valid_token().await?;
//! # let _ = bearer;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod manager;
pub mod pkce;
pub mod prelude;
pub mod scope;
pub mod store;
pub mod token;
pub mod transport;
pub mod user_agent;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{AuthError, Result};
pub use manager::AuthManager;
pub use token::Token;
