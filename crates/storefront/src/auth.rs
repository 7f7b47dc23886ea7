//! Authentication state.
//!
//! The storefront never authenticates anyone itself: the auth API returns a
//! user document on login and the front end keeps it in the key-value store.
//! The cart only asks one question, [`AuthState::is_authenticated`].

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// Default storage key for the signed-in user.
pub const DEFAULT_USER_KEY: &str = "user";

/// Anything that can tell whether a shopper is signed in.
pub trait AuthState {
    fn is_authenticated(&self) -> bool;
}

impl AuthState for bool {
    fn is_authenticated(&self) -> bool {
        *self
    }
}

impl<T: AuthState + ?Sized> AuthState for &T {
    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }
}

/// The signed-in user as returned by the auth API.
///
/// Only the fields checkout pre-fills are kept; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl CurrentUser {
    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.first_name.trim().is_empty() {
            &self.email
        } else {
            &self.first_name
        }
    }
}

/// Session persisted in a key-value store under a single key.
#[derive(Debug, Clone)]
pub struct StoredSession<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> StoredSession<S> {
    /// Session read from `store` under `key`.
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The signed-in user, `None` if absent, unreadable or malformed.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        let raw = match self.store.get(&self.key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed session");
                None
            }
        }
    }

    /// Store `user` as the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user can't be encoded or the store
    /// can't be written.
    pub fn sign_in(&self, user: &CurrentUser) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user)?;
        self.store.set(&self.key, &raw)?;
        tracing::info!(email = %user.email, "Signed in");
        Ok(())
    }

    /// Forget the signed-in user. The cart is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store can't be written.
    pub fn sign_out(&self) -> Result<(), StorageError> {
        self.store.remove(&self.key)?;
        tracing::info!("Signed out");
        Ok(())
    }
}

impl<S: KeyValueStore> AuthState for StoredSession<S> {
    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}
