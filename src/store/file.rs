use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TokenStore;
use crate::config::StoreConfig;
use crate::error::{AuthError, Result};
use crate::token::Token;

const FILE_VERSION: u32 = 1;

/// File-backed token store using TOML files.
///
/// The file is written with `0600` permissions on Unix.
///
/// # Example
/// ```no_run
/// use chrono::{Duration, Utc};
/// use hub_auth::config::StoreConfig;
/// use hub_auth::store::{FileTokenStore, TokenStore};
/// use hub_auth::Token;
///
/// let store = FileTokenStore::new_default(StoreConfig::default());
/// store.store(&Token::new("access", Utc::now() + Duration::hours(1)))?;
/// # Ok::<(), hub_auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    base_dir: PathBuf,
    config: StoreConfig,
}

impl FileTokenStore {
    pub fn new(base_dir: impl Into<PathBuf>, config: StoreConfig) -> Self {
        Self {
            base_dir: base_dir.into(),
            config,
        }
    }

    /// Store under `~/.hub-auth`.
    pub fn new_default(config: StoreConfig) -> Self {
        Self::new(default_dir(), config)
    }

    /// `{service}.toml` for the default account, else `{service}.{account}.toml`.
    ///
    /// Identifiers are escaped byte-wise, so distinct identifiers never
    /// share a file.
    pub fn path(&self) -> PathBuf {
        let service = file_label(&self.config.service);
        let name = if self.config.account == "default" {
            format!("{service}.toml")
        } else {
            format!("{service}.{}.toml", file_label(&self.config.account))
        };
        self.base_dir.join(name)
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn store(&self, token: &Token) -> Result<()> {
        let path = self.path();
        Self::ensure_parent(&path)?;
        let file = TokenFile {
            version: FILE_VERSION,
            service: self.config.service.clone(),
            account: self.config.account.clone(),
            saved_at: Utc::now(),
            token: token.clone(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        debug!(path = %path.display(), "token written to file store");
        Ok(())
    }

    fn retrieve(&self) -> Result<Option<Token>> {
        let path = self.path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Storage(err.to_string())),
        };
        let file: TokenFile = toml::from_str(&raw)?;
        if file.version != FILE_VERSION {
            return Err(AuthError::Storage(format!(
                "unsupported token file version {} in {}",
                file.version,
                path.display()
            )));
        }
        Ok(Some(file.token))
    }

    fn delete(&self) -> Result<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Storage(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenFile {
    version: u32,
    service: String,
    account: String,
    saved_at: DateTime<Utc>,
    token: Token,
}

fn default_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".hub-auth"))
        .unwrap_or_else(|| PathBuf::from(".hub-auth"))
}

/// Keeps `[A-Za-z0-9_-]`, writes every other byte as `%XX`.
fn file_label(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
