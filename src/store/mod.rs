//! Token persistence.

mod file;
mod memory;
#[cfg(feature = "keyring")]
mod secure;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;
#[cfg(feature = "keyring")]
pub use secure::KeyringTokenStore;

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::token::Token;

/// Storage abstraction for the persisted token.
///
/// A store holds at most one token. `retrieve` after `store` returns an equal
/// token unless `delete` ran in between; `delete` on an empty store succeeds.
pub trait TokenStore: Send + Sync {
    fn store(&self, token: &Token) -> Result<()>;
    fn retrieve(&self) -> Result<Option<Token>>;
    fn delete(&self) -> Result<()>;
}

/// The platform credential store for the given identifiers.
#[cfg(feature = "keyring")]
pub fn default_store(config: &StoreConfig) -> Result<Arc<dyn TokenStore>> {
    Ok(Arc::new(KeyringTokenStore::new(config.clone())?))
}

/// File store under the home directory (built without `keyring`).
#[cfg(not(feature = "keyring"))]
pub fn default_store(config: &StoreConfig) -> Result<Arc<dyn TokenStore>> {
    Ok(Arc::new(FileTokenStore::new_default(config.clone())))
}
