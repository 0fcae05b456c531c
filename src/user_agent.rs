//! The interactive step: show the authorization page, collect the redirect.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use url::Url;

use crate::error::{AuthError, Result};

/// What the user agent came back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgentOutcome {
    /// The server redirected to the configured redirect URL.
    Redirect(Url),
    /// The user closed or declined the login.
    Cancelled,
}

/// Presents the authorization URL and waits for the redirect.
///
/// This is the step that takes human-scale time; implementations should be
/// cancel-safe so that dropping the future abandons the attempt cleanly.
#[async_trait]
pub trait UserAgent: Send + Sync {
    async fn authorize(&self, authorization_url: &Url, redirect_url: &Url) -> Result<UserAgentOutcome>;
}

/// Terminal user agent: prints the URL, optionally opens the browser, and
/// reads the redirect URL the user pastes back. An empty line cancels.
#[derive(Debug, Clone)]
pub struct ConsoleUserAgent {
    open_browser: bool,
}

impl ConsoleUserAgent {
    pub fn new() -> Self {
        Self { open_browser: true }
    }

    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }
}

impl Default for ConsoleUserAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserAgent for ConsoleUserAgent {
    async fn authorize(&self, authorization_url: &Url, redirect_url: &Url) -> Result<UserAgentOutcome> {
        if self.open_browser {
            if let Err(err) = open::that(authorization_url.as_str()) {
                warn!(error = %err, "could not open a browser");
            }
        }
        eprintln!("Visit: {authorization_url}");
        eprintln!("After authorizing, paste the full URL you were redirected to ({redirect_url}...).");
        eprintln!("Press Enter on an empty line to cancel.");

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|err| AuthError::InvalidRedirect(format!("could not read input: {err}")))?;
        parse_pasted_redirect(&line)
    }
}

fn parse_pasted_redirect(input: &str) -> Result<UserAgentOutcome> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(UserAgentOutcome::Cancelled);
    }
    Url::parse(input)
        .map(UserAgentOutcome::Redirect)
        .map_err(|err| AuthError::InvalidRedirect(format!("`{input}` is not a URL: {err}")))
}
