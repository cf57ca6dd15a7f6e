//! Microphone capture and the recording state machine.
//!
//! [`AudioCapture`] is the platform seam; [`Recorder`] drives it through
//! `Idle -> Recording -> Idle`, timing the capture and turning the finished
//! resource into a stored [`Recording`].

use chrono::Local;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::recording::{Recording, RecordingLibrary};

/// Trait for platform-specific microphone capture.
#[async_trait::async_trait]
pub trait AudioCapture: Send + Sync + std::fmt::Debug {
    /// The name of this capture backend (for logging).
    fn name(&self) -> &'static str;

    /// Ask the platform for microphone access.
    ///
    /// # Errors
    ///
    /// Returns an error if the permission state cannot be determined.
    async fn request_permission(&self) -> Result<bool>;

    /// Begin capturing audio.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture device cannot be started.
    async fn start(&mut self) -> Result<()>;

    /// Stop capturing, release the device and return the URI of the captured
    /// resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture cannot be stopped or produced no resource.
    async fn stop(&mut self) -> Result<String>;
}

/// Current state of the [`Recorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    /// Not capturing.
    #[default]
    Idle,
    /// Capturing since `started_at`.
    Recording {
        /// When the capture entered this state.
        started_at: Instant,
    },
}

/// Drives an [`AudioCapture`] and saves finished captures.
///
/// A capture belongs to the user it was started for and is saved to that
/// user's list no matter who is logged in when it stops.
#[derive(Debug)]
pub struct Recorder {
    capture: Box<dyn AudioCapture>,
    library: RecordingLibrary,
    default_prefix: String,
    state: CaptureState,
    owner: Option<String>,
}

impl Recorder {
    /// Create an idle recorder.
    #[must_use]
    pub fn new(
        capture: Box<dyn AudioCapture>,
        library: RecordingLibrary,
        default_prefix: impl Into<String>,
    ) -> Self {
        Self {
            capture,
            library,
            default_prefix: default_prefix.into(),
            state: CaptureState::Idle,
            owner: None,
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Email of the user the running capture is saved for.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Whether a capture is in progress.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        matches!(self.state, CaptureState::Recording { .. })
    }

    /// Time spent in the current capture, zero when idle.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        match self.state {
            CaptureState::Idle => std::time::Duration::ZERO,
            CaptureState::Recording { started_at } => started_at.elapsed(),
        }
    }

    /// Request permission and start capturing for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] if microphone access is refused,
    /// [`Error::AlreadyRecording`] if a capture is running, or the backend's
    /// start error. The recorder stays idle on every error.
    pub async fn start(&mut self, owner: &str) -> Result<()> {
        if self.is_recording() {
            return Err(Error::AlreadyRecording);
        }

        if !self.capture.request_permission().await? {
            warn!(backend = self.capture.name(), "Microphone permission denied");
            return Err(Error::PermissionDenied);
        }

        if let Err(e) = self.capture.start().await {
            error!(backend = self.capture.name(), error = %e, "Failed to start recording");
            return Err(e);
        }

        self.state = CaptureState::Recording {
            started_at: Instant::now(),
        };
        self.owner = Some(owner.to_string());
        info!(backend = self.capture.name(), owner, "Recording started");
        Ok(())
    }

    /// Stop capturing and append the finished recording to the owner's list.
    ///
    /// The recorder is idle afterwards even if finalizing fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRecording`] when idle, the backend's stop error, or
    /// a storage error from saving the record.
    pub async fn stop(&mut self, name: Option<&str>) -> Result<Recording> {
        let (CaptureState::Recording { started_at }, Some(owner)) =
            (std::mem::take(&mut self.state), self.owner.take())
        else {
            return Err(Error::NotRecording);
        };
        let elapsed = started_at.elapsed();

        let uri = self.capture.stop().await.map_err(|e| {
            error!(backend = self.capture.name(), error = %e, "Failed to stop recording");
            e
        })?;
        debug!(uri = %uri, elapsed_ms = elapsed.as_millis(), "Capture finalized");

        let recording = Recording::new(name, &self.default_prefix, uri, &Local::now(), elapsed);
        self.library
            .add(&owner, recording.clone())
            .inspect_err(|e| {
                error!(
                    error = %e,
                    owner = %owner,
                    uri = %recording.uri,
                    "Failed to save recording, captured audio is left unlisted"
                );
            })?;
        Ok(recording)
    }

    /// Start for `owner` when idle, stop and save when recording.
    ///
    /// Returns the saved recording when this call stopped a capture.
    ///
    /// # Errors
    ///
    /// See [`Recorder::start`] and [`Recorder::stop`].
    pub async fn toggle(&mut self, owner: &str, name: Option<&str>) -> Result<Option<Recording>> {
        if self.is_recording() {
            self.stop(name).await.map(Some)
        } else {
            self.start(owner).await.map(|()| None)
        }
    }
}
