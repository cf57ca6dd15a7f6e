//! Registered users and the credential store.
//!
//! Passwords are stored and compared as plain text. The comparison goes
//! through [`CredentialVerifier`] so that a salted-hash implementation can be
//! substituted; [`PlaintextVerifier`] is not suitable for real deployments.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::recording::Recording;
use crate::storage::{keys, PersistentStore, StoreExt};

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").ok());

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Unique login identifier.
    pub email: String,
    /// Stored password, compared by the [`CredentialVerifier`].
    pub password: String,
    /// Never populated; recordings live in their own partition.
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

/// Registration form contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewUser {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login identifier.
    pub email: String,
    /// Chosen password.
    pub password: String,
}

impl NewUser {
    /// Check that every field is filled in and the email looks like one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_input(field, "must not be empty"));
            }
        }

        let pattern = EMAIL_PATTERN
            .as_ref()
            .ok_or_else(|| Error::internal("email pattern failed to compile"))?;
        if !pattern.is_match(&self.email) {
            return Err(Error::invalid_input("email", "not an email address"));
        }
        Ok(())
    }
}

impl From<NewUser> for User {
    fn from(form: NewUser) -> Self {
        Self {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            password: form.password,
            recordings: Vec::new(),
        }
    }
}

/// Decides whether a supplied password matches a stored user.
pub trait CredentialVerifier: Send + Sync + std::fmt::Debug {
    /// Return `true` if `password` unlocks `user`.
    fn verify(&self, user: &User, password: &str) -> bool;
}

/// Exact string comparison against the stored password.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn verify(&self, user: &User, password: &str) -> bool {
        user.password == password
    }
}

/// The list of registered users, keyed by email.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    store: Arc<dyn PersistentStore>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl CredentialStore {
    /// Create a credential store using plaintext comparison.
    #[must_use]
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self::with_verifier(store, Arc::new(PlaintextVerifier))
    }

    /// Create a credential store with a custom verifier.
    #[must_use]
    pub fn with_verifier(
        store: Arc<dyn PersistentStore>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self { store, verifier }
    }

    /// All registered users in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the user list cannot be read.
    pub fn users(&self) -> Result<Vec<User>> {
        Ok(self.store.get_json(keys::USERS)?.unwrap_or_default())
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateUser`] if the email is taken,
    /// [`Error::InvalidInput`] if the form is incomplete, or a storage error.
    pub fn register(&self, form: NewUser) -> Result<User> {
        form.validate()?;

        let mut users = self.users()?;
        if users.iter().any(|u| u.email == form.email) {
            warn!(email = %form.email, "Registration rejected, email already taken");
            return Err(Error::DuplicateUser { email: form.email });
        }

        let user = User::from(form);
        users.push(user.clone());
        self.store.set_json(keys::USERS, &users)?;

        info!(email = %user.email, "Registered user");
        Ok(user)
    }

    /// Find the first user matching both email and password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`] if nothing matches.
    pub fn find_user(&self, email: &str, password: &str) -> Result<User> {
        let found = self
            .users()?
            .into_iter()
            .find(|u| u.email == email && self.verifier.verify(u, password));

        found.ok_or_else(|| {
            debug!(email, "No user matches the supplied credentials");
            Error::InvalidCredentials
        })
    }

    /// Look a user up by email alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the user list cannot be read.
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users()?.into_iter().find(|u| u.email == email))
    }
}
