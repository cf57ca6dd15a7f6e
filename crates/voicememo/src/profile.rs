//! First and last name shown on the recording screen, scoped by user.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::storage::{keys, PersistentStore};

/// Editable profile values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl Profile {
    /// Both names are filled in.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
    }
}

/// Reads and writes profiles as two scalar keys per user.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    store: Arc<dyn PersistentStore>,
}

impl ProfileStore {
    /// Create a profile store.
    #[must_use]
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    /// Stored profile for `email`; missing values read as empty strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(&self, email: &str) -> Result<Profile> {
        Ok(Profile {
            first_name: self
                .store
                .get(&keys::profile_first_name(email))?
                .unwrap_or_default(),
            last_name: self
                .store
                .get(&keys::profile_last_name(email))?
                .unwrap_or_default(),
        })
    }

    /// Overwrite the profile for `email`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteProfile`] unless both names are filled in,
    /// or a storage error.
    pub fn save(&self, email: &str, profile: &Profile) -> Result<()> {
        if !profile.is_complete() {
            return Err(Error::IncompleteProfile);
        }
        self.store
            .set(&keys::profile_first_name(email), &profile.first_name)?;
        self.store
            .set(&keys::profile_last_name(email), &profile.last_name)?;
        info!(email, "Profile updated");
        Ok(())
    }

    /// Remove the stored profile for `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self, email: &str) -> Result<()> {
        self.store.remove(&keys::profile_first_name(email))?;
        self.store.remove(&keys::profile_last_name(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn profile(first: &str, last: &str) -> Profile {
        Profile {
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let profiles = ProfileStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(profiles.load("a@x.com").unwrap(), Profile::default());
    }

    #[test]
    fn test_save_and_load() {
        let profiles = ProfileStore::new(Arc::new(MemoryStore::new()));
        profiles.save("a@x.com", &profile("Ada", "King")).unwrap();

        assert_eq!(profiles.load("a@x.com").unwrap(), profile("Ada", "King"));
    }

    #[test]
    fn test_profiles_scoped_per_user() {
        let profiles = ProfileStore::new(Arc::new(MemoryStore::new()));
        profiles.save("a@x.com", &profile("Ada", "King")).unwrap();

        assert_eq!(profiles.load("b@x.com").unwrap(), Profile::default());
    }

    #[test]
    fn test_incomplete_profile_rejected() {
        let profiles = ProfileStore::new(Arc::new(MemoryStore::new()));
        profiles.save("a@x.com", &profile("Ada", "King")).unwrap();

        assert!(matches!(
            profiles.save("a@x.com", &profile("Ada", " ")),
            Err(Error::IncompleteProfile)
        ));
        assert_eq!(profiles.load("a@x.com").unwrap(), profile("Ada", "King"));
    }

    #[test]
    fn test_clear() {
        let profiles = ProfileStore::new(Arc::new(MemoryStore::new()));
        profiles.save("a@x.com", &profile("Ada", "King")).unwrap();
        profiles.clear("a@x.com").unwrap();

        assert_eq!(profiles.load("a@x.com").unwrap(), Profile::default());
    }
}
