//! The session marker: which user is logged in.
//!
//! Only the email is persisted. User details are looked up from the
//! [`CredentialStore`] when needed.

use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::profile::ProfileStore;
use crate::storage::{keys, PersistentStore};
use crate::user::{CredentialStore, User};

/// Login, logout and session lookup.
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Arc<dyn PersistentStore>,
    credentials: CredentialStore,
    profiles: ProfileStore,
}

impl SessionManager {
    /// Create a session manager.
    #[must_use]
    pub fn new(
        store: Arc<dyn PersistentStore>,
        credentials: CredentialStore,
        profiles: ProfileStore,
    ) -> Self {
        Self {
            store,
            credentials,
            profiles,
        }
    }

    /// Verify the credentials and persist the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`] on mismatch, or a storage error.
    pub fn login(&self, email: &str, password: &str) -> Result<User> {
        let user = self.credentials.find_user(email, password)?;
        self.store.set(keys::SESSION_EMAIL, &user.email)?;
        info!(email = %user.email, "Logged in");
        Ok(user)
    }

    /// Clear the session marker and the session user's profile.
    ///
    /// Logging out without a session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn logout(&self) -> Result<()> {
        if let Some(email) = self.current()? {
            self.profiles.clear(&email)?;
            info!(email = %email, "Logged out");
        }
        self.store.remove(keys::SESSION_EMAIL)
    }

    /// Email of the logged-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn current(&self) -> Result<Option<String>> {
        self.store.get(keys::SESSION_EMAIL)
    }

    /// Email of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] when there is no session.
    pub fn require(&self) -> Result<String> {
        self.current()?.ok_or(Error::NotLoggedIn)
    }

    /// Full record of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] when there is no session or the session
    /// names a user that is no longer registered.
    pub fn current_user(&self) -> Result<User> {
        let email = self.require()?;
        self.credentials
            .find_by_email(&email)?
            .ok_or(Error::NotLoggedIn)
    }
}
