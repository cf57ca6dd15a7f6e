//! Playback of saved recordings.
//!
//! [`Player`] keeps at most one sound loaded: starting a new playback unloads
//! the previous sound first, and [`Player::release`] unloads the current one.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::recording::Recording;

/// Opaque identifier of a sound loaded by an [`AudioPlayback`] backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u64);

/// Trait for platform-specific sound playback.
#[async_trait]
pub trait AudioPlayback: Send + Sync + std::fmt::Debug {
    /// Load the resource at `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PlaybackFailure`] if the resource cannot be loaded.
    async fn load(&self, uri: &str) -> Result<SoundHandle>;

    /// Begin playing a loaded sound.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PlaybackFailure`] if playback cannot start.
    async fn play(&self, sound: SoundHandle) -> Result<()>;

    /// Wait until a playing sound has finished.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PlaybackFailure`] if playback ended abnormally.
    async fn wait(&self, _sound: SoundHandle) -> Result<()> {
        Ok(())
    }

    /// Stop and release a sound.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to release the sound.
    async fn unload(&self, sound: SoundHandle) -> Result<()>;
}

/// Plays one recording at a time.
#[derive(Debug)]
pub struct Player {
    backend: Box<dyn AudioPlayback>,
    current: Option<SoundHandle>,
}

impl Player {
    /// Create a player with nothing loaded.
    #[must_use]
    pub fn new(backend: Box<dyn AudioPlayback>) -> Self {
        Self {
            backend,
            current: None,
        }
    }

    /// The sound currently retained, if any.
    #[must_use]
    pub fn current(&self) -> Option<SoundHandle> {
        self.current
    }

    /// Release any previous sound, then load and play `recording`.
    ///
    /// # Errors
    ///
    /// Returns the backend's load or play error. Nothing is retained after a
    /// failure.
    pub async fn play(&mut self, recording: &Recording) -> Result<()> {
        self.release().await;

        let sound = self.backend.load(&recording.uri).await?;
        self.current = Some(sound);
        debug!(id = %recording.id, ?sound, "Playing recording");

        if let Err(e) = self.backend.play(sound).await {
            self.release().await;
            return Err(e);
        }
        Ok(())
    }

    /// Wait for the current sound to finish, then release it.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if playback ended abnormally; the sound is
    /// released either way.
    pub async fn finish(&mut self) -> Result<()> {
        let Some(sound) = self.current else {
            return Ok(());
        };
        let outcome = self.backend.wait(sound).await;
        self.release().await;
        outcome
    }

    /// Unload the retained sound, if any.
    ///
    /// Unload failures are logged; the handle is dropped regardless.
    pub async fn release(&mut self) {
        if let Some(sound) = self.current.take() {
            if let Err(e) = self.backend.unload(sound).await {
                warn!(?sound, error = %e, "Failed to unload sound");
            }
        }
    }
}
