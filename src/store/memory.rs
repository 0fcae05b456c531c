use std::sync::Mutex;

use super::TokenStore;
use crate::error::{AuthError, Result};
use crate::token::Token;

/// Process-local store; nothing touches disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<Token>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: Token) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Token>>> {
        self.token
            .lock()
            .map_err(|_| AuthError::Storage("memory store lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn store(&self, token: &Token) -> Result<()> {
        *self.slot()? = Some(token.clone());
        Ok(())
    }

    fn retrieve(&self) -> Result<Option<Token>> {
        Ok(self.slot()?.clone())
    }

    fn delete(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}
