//! Recording metadata and the per-user recording list.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::storage::{keys, PersistentStore, StoreExt};

/// Display format of [`Recording::date`].
pub const DATE_FORMAT: &str = "%m/%d/%Y, %H:%M:%S";

/// A named, dated, timed reference to a captured audio resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    /// Capture-stop time in milliseconds since the epoch, as a string.
    pub id: String,
    /// User-facing name.
    pub name: String,
    /// Location of the captured audio.
    pub uri: String,
    /// Capture-stop time formatted with [`DATE_FORMAT`].
    pub date: String,
    /// Length in whole seconds.
    pub duration: u64,
}

impl Recording {
    /// Build the record for a capture that stopped at `stopped_at`.
    ///
    /// A blank `name` falls back to `<prefix>-<millis>`.
    #[must_use]
    pub fn new<Tz>(
        name: Option<&str>,
        default_prefix: &str,
        uri: impl Into<String>,
        stopped_at: &DateTime<Tz>,
        elapsed: Duration,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let millis = stopped_at.timestamp_millis();
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => format!("{default_prefix}-{millis}"),
        };

        Self {
            id: millis.to_string(),
            name,
            uri: uri.into(),
            date: stopped_at.format(DATE_FORMAT).to_string(),
            duration: elapsed.as_secs(),
        }
    }

    /// Duration rendered as `m:ss`.
    #[must_use]
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration)
    }
}

/// Render seconds as `m:ss`.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Keep the recordings whose display date contains `query`, ignoring case.
///
/// Order is preserved and an empty query keeps everything.
#[must_use]
pub fn filter_by_date(recordings: &[Recording], query: &str) -> Vec<Recording> {
    let needle = query.to_lowercase();
    recordings
        .iter()
        .filter(|r| r.date.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Per-user recording lists over a [`PersistentStore`].
///
/// Each list is stored whole under `recordings.<email>`. Mutations go through
/// [`StoreExt::update_json`], so concurrent read-modify-write cycles, even
/// from separate `vmemo` processes, cannot drop each other's changes.
#[derive(Debug, Clone)]
pub struct RecordingLibrary {
    store: Arc<dyn PersistentStore>,
}

impl RecordingLibrary {
    /// Create a library over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    fn modify<T>(&self, email: &str, edit: impl FnOnce(&mut Vec<Recording>) -> T) -> Result<T> {
        self.store.update_json(&keys::recordings(email), edit)
    }

    /// The user's recordings in insertion order; empty if none were stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be read or decoded.
    pub fn list(&self, email: &str) -> Result<Vec<Recording>> {
        Ok(self
            .store
            .get_json(&keys::recordings(email))?
            .unwrap_or_default())
    }

    /// Find one recording by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be read or decoded.
    pub fn get(&self, email: &str, id: &str) -> Result<Option<Recording>> {
        Ok(self.list(email)?.into_iter().find(|r| r.id == id))
    }

    /// Append a recording and persist the whole list.
    ///
    /// Returns the updated list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be read or written.
    pub fn add(&self, email: &str, recording: Recording) -> Result<Vec<Recording>> {
        let id = recording.id.clone();
        let updated = self.modify(email, |list| {
            list.push(recording);
            list.clone()
        })?;
        info!(email, id = %id, total = updated.len(), "Saved recording");
        Ok(updated)
    }

    /// Drop the recording with `id` and persist the remainder.
    ///
    /// Returns whether anything was removed; an unknown id leaves the list
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be read or written.
    pub fn remove(&self, email: &str, id: &str) -> Result<bool> {
        let removed = self.modify(email, |list| {
            let before = list.len();
            list.retain(|r| r.id != id);
            before != list.len()
        })?;
        if removed {
            info!(email, id, "Deleted recording");
        } else {
            debug!(email, id, "Delete requested for unknown recording");
        }
        Ok(removed)
    }

    /// Recordings whose display date contains `query`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be read or decoded.
    pub fn search(&self, email: &str, query: &str) -> Result<Vec<Recording>> {
        Ok(filter_by_date(&self.list(email)?, query))
    }
}
