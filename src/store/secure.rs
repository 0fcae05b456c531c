use tracing::debug;

use super::TokenStore;
use crate::config::StoreConfig;
use crate::error::{AuthError, Result};
use crate::token::Token;

/// Platform credential store (Keychain, Secret Service, Credential Manager).
///
/// The token is serialized as JSON under the configured service/account pair.
pub struct KeyringTokenStore {
    entry: keyring::Entry,
    config: StoreConfig,
}

impl KeyringTokenStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let entry = keyring::Entry::new(&config.service, &config.account)?;
        Ok(Self { entry, config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl std::fmt::Debug for KeyringTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringTokenStore")
            .field("config", &self.config)
            .finish()
    }
}

impl TokenStore for KeyringTokenStore {
    fn store(&self, token: &Token) -> Result<()> {
        let data = serde_json::to_string(token)?;
        self.entry.set_password(&data)?;
        debug!(service = %self.config.service, account = %self.config.account, "token written to keyring");
        Ok(())
    }

    fn retrieve(&self) -> Result<Option<Token>> {
        match self.entry.get_password() {
            Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(AuthError::from(err)),
        }
    }

    fn delete(&self) -> Result<()> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(AuthError::from(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn mock_store() -> KeyringTokenStore {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        KeyringTokenStore::new(StoreConfig::new("hub-auth-test", "default")).unwrap()
    }

    #[test]
    fn store_retrieve_delete_cycle() {
        let store = mock_store();
        assert!(store.retrieve().unwrap().is_none());

        let token = Token::new("access", Utc::now() + Duration::hours(1)).with_refresh_token("r");
        store.store(&token).unwrap();
        assert_eq!(store.retrieve().unwrap(), Some(token));

        store.delete().unwrap();
        assert!(store.retrieve().unwrap().is_none());
        store.delete().unwrap();
    }

    #[test]
    fn debug_does_not_touch_the_credential() {
        let store = mock_store();
        assert!(format!("{store:?}").contains("hub-auth-test"));
    }
}
