//! CLI handlers for login, status, token, and logout.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use crate::client::OAuthClient;
use crate::config::{OAuthConfig, StoreConfig};
use crate::error::AuthError;
use crate::manager::AuthManager;
use crate::store::{self, FileTokenStore, TokenStore};
use crate::user_agent::ConsoleUserAgent;

use super::LoginArgs;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn open_store(file_store: Option<&Path>) -> Result<Arc<dyn TokenStore>, AuthError> {
    let config = StoreConfig::default();
    match file_store {
        Some(dir) => Ok(Arc::new(FileTokenStore::new(dir, config))),
        None => store::default_store(&config),
    }
}

/// Handle `hub-auth login`.
pub async fn handle_login(args: LoginArgs, file_store: Option<&Path>) -> CliResult {
    let mut config = OAuthConfig::from_env()?;
    if let Some(preset) = args.scopes {
        config = config.with_scopes(preset.scopes());
    }
    let user_agent = if args.no_browser {
        ConsoleUserAgent::new().without_browser()
    } else {
        ConsoleUserAgent::new()
    };
    let manager = AuthManager::new(
        OAuthClient::new(config),
        open_store(file_store)?,
        Arc::new(user_agent),
    )?;

    match manager.sign_in().await {
        Ok(()) => {
            println!("✅ Login successful!");
            if let Some(token) = manager.current_token().await {
                println!("   Expires {}", token.expires_at.format("%Y-%m-%d %H:%M"));
                if let Some(scope) = token.scope {
                    println!("   Scopes: {scope}");
                }
            }
            Ok(())
        }
        Err(AuthError::UserCancelled) => {
            eprintln!("❌ Login cancelled.");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Handle `hub-auth status`.
pub async fn handle_status(file_store: Option<&Path>) -> CliResult {
    let store = open_store(file_store)?;

    println!("🔐 Authentication Status\n");
    match store.retrieve() {
        Ok(Some(token)) => {
            let now = Utc::now();
            if !token.is_expired_at(now) {
                println!(
                    "  ✅ Logged in (expires {})",
                    token.expires_at.format("%Y-%m-%d %H:%M")
                );
            } else if token.can_refresh() {
                println!("  ⚠️  Token expired (will refresh on next use)");
            } else {
                println!("  ⚠️  Token expired, run `hub-auth login`");
            }
            if let Some(scope) = &token.scope {
                println!("  Scopes: {scope}");
            }
        }
        Ok(None) => println!("  ❌ Not logged in"),
        Err(e) => println!("  ⚠️  Error: {e}"),
    }
    Ok(())
}

/// Handle `hub-auth token`.
pub async fn handle_token(file_store: Option<&Path>) -> CliResult {
    let config = OAuthConfig::from_env()?;
    let manager = AuthManager::new(
        OAuthClient::new(config),
        open_store(file_store)?,
        Arc::new(ConsoleUserAgent::new()),
    )?;
    match manager.get_valid_token().await {
        Ok(token) => {
            println!("{token}");
            Ok(())
        }
        Err(AuthError::AuthenticationRequired) => {
            eprintln!("❌ Not logged in. Run `hub-auth login` first.");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Handle `hub-auth logout`.
///
/// Works without client configuration so a broken environment can still
/// clear the stored session.
pub async fn handle_logout(file_store: Option<&Path>) -> CliResult {
    open_store(file_store)?.delete()?;
    println!("✅ Logged out");
    Ok(())
}
