//! Client-side auth state
//!
//! Stores the admin bearer token and a profile snapshot in a key/value
//! storage backend, and broadcasts an [`AuthEvent`] whenever they change so
//! other parts of a client can refresh. Nothing here validates the token:
//! the backend checks it on every call.

pub mod storage;

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::models::AdminUser;

pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError};

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "adminToken";

/// Storage key holding the JSON admin snapshot
pub const ADMIN_DATA_KEY: &str = "adminData";

const EVENT_CAPACITY: usize = 16;

/// Auth state change notification
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(AdminUser),
    ProfileUpdated(AdminUser),
    SignedOut,
}

/// Token and admin snapshot storage with change notification
#[derive(Clone)]
pub struct AuthStore {
    storage: Arc<dyn StorageBackend>,
    events: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}

impl AuthStore {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { storage, events }
    }

    /// Store backed by process memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Store backed by a JSON file
    pub fn file(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(FileStorage::new(path)))
    }

    /// Receive every change made through this store (or its clones)
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: AuthEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }

    /// Save the admin snapshot and the token.
    ///
    /// The token is written last: a stored token always has a snapshot next
    /// to it. A failed token write removes the snapshot again.
    pub fn set_auth_data(&self, token: &str, admin: &AdminUser) -> Result<(), StorageError> {
        let json = serde_json::to_string(admin)?;
        self.storage.set_item(ADMIN_DATA_KEY, &json)?;
        if let Err(e) = self.storage.set_item(TOKEN_KEY, token) {
            if let Err(cleanup) = self.storage.remove_item(ADMIN_DATA_KEY) {
                tracing::warn!("Failed to roll back admin data: {}", cleanup);
            }
            return Err(e);
        }
        tracing::debug!(admin = %admin.email, "Auth data stored");
        self.notify(AuthEvent::SignedIn(admin.clone()));
        Ok(())
    }

    /// Replace the admin snapshot, keeping the token
    pub fn update_admin_data(&self, admin: &AdminUser) -> Result<(), StorageError> {
        let json = serde_json::to_string(admin)?;
        self.storage.set_item(ADMIN_DATA_KEY, &json)?;
        self.notify(AuthEvent::ProfileUpdated(admin.clone()));
        Ok(())
    }

    pub fn get_auth_token(&self) -> Result<Option<String>, StorageError> {
        self.storage.get_item(TOKEN_KEY)
    }

    /// Stored admin snapshot. Unreadable JSON counts as absent.
    pub fn get_admin_data(&self) -> Result<Option<AdminUser>, StorageError> {
        let Some(json) = self.storage.get_item(ADMIN_DATA_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(admin) => Ok(Some(admin)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable admin data: {}", e);
                Ok(None)
            }
        }
    }

    /// Remove the token and the snapshot
    pub fn clear_auth_data(&self) -> Result<(), StorageError> {
        self.storage.remove_item(TOKEN_KEY)?;
        self.storage.remove_item(ADMIN_DATA_KEY)?;
        tracing::debug!("Auth data cleared");
        self.notify(AuthEvent::SignedOut);
        Ok(())
    }

    /// True exactly when a token is stored. No expiry check.
    pub fn is_authenticated(&self) -> Result<bool, StorageError> {
        Ok(self.get_auth_token()?.is_some())
    }

    /// `Authorization` header value for the stored token
    pub fn bearer(&self) -> Result<Option<String>, StorageError> {
        Ok(self.get_auth_token()?.map(|token| format!("Bearer {}", token)))
    }
}
