use crate::config::SESSION_KEY;
use crate::error::AppError;
use crate::storage::Storage;
use log::{info, warn};
use std::sync::Arc;

/// The persisted session token.
///
/// Its presence gates every task request; its absence means the front-end has
/// to show the login page.
#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn Storage>,
    key: String,
}

impl Session {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_key(storage, SESSION_KEY)
    }

    pub fn with_key(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The stored token. Unreadable storage counts as logged out.
    pub fn token(&self) -> Option<String> {
        match self.storage.get(&self.key) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Could not read session token: {}", e);
                None
            }
        }
    }

    pub fn require_token(&self) -> Result<String, AppError> {
        self.token().ok_or_else(|| {
            warn!("No session token stored, login required");
            AppError::MissingSession
        })
    }

    pub fn store(&self, token: &str) -> Result<(), AppError> {
        self.storage.set(&self.key, token)?;
        info!("Session token stored");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), AppError> {
        info!("Logging out user");
        self.storage.remove(&self.key)
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }
}
