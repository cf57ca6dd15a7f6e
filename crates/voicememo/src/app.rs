//! The application: screens, notices and every user action.
//!
//! [`App`] owns one instance of each service and routes actions to them,
//! checking the session first. Platform failures are logged here before
//! they are returned.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::capture::{AudioCapture, Recorder};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::platform::{CommandCapture, CommandOpener, CommandPlayback, DirectoryShare};
use crate::playback::{AudioPlayback, Player};
use crate::profile::{Profile, ProfileStore};
use crate::recording::{Recording, RecordingLibrary};
use crate::session::SessionManager;
use crate::share::{ShareSheet, Sharer, UrlOpener};
use crate::storage::PersistentStore;
use crate::user::{CredentialStore, NewUser, User};

/// The screen currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Account creation form.
    Register,
    /// Email and password form.
    Login,
    /// Recorder, recording list and profile.
    Recording,
}

/// A message shown to the user after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Registration stored the new user.
    Registered,
    /// Registration found the email already taken.
    UserExists,
    /// Login succeeded.
    LoggedIn,
    /// Login credentials did not match.
    InvalidLogin,
    /// Recording was refused microphone access.
    MicrophoneRequired,
    /// Profile names were saved.
    ProfileUpdated,
    /// A required field was left blank.
    FillAllFields,
}

impl Notice {
    /// Text shown to the user.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Registered => "Registration successful! Please log in.",
            Self::UserExists => "User already exists. Please log in.",
            Self::LoggedIn => "Login successful!",
            Self::InvalidLogin => "Invalid email or password.",
            Self::MicrophoneRequired => "Microphone permission is required to record audio.",
            Self::ProfileUpdated => "Profile updated successfully!",
            Self::FillAllFields => "Please fill out all fields.",
        }
    }

    /// The notice an error is reported as, if it has one.
    #[must_use]
    pub fn from_error(error: &Error) -> Option<Self> {
        match error {
            Error::DuplicateUser { .. } => Some(Self::UserExists),
            Error::InvalidCredentials => Some(Self::InvalidLogin),
            Error::PermissionDenied => Some(Self::MicrophoneRequired),
            Error::IncompleteProfile => Some(Self::FillAllFields),
            _ => None,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Platform services the application runs on.
#[derive(Debug)]
pub struct Capabilities {
    /// Microphone capture.
    pub capture: Box<dyn AudioCapture>,
    /// Sound playback.
    pub playback: Box<dyn AudioPlayback>,
    /// Share surface.
    pub share_sheet: Box<dyn ShareSheet>,
    /// External link opener.
    pub opener: Box<dyn UrlOpener>,
}

impl Capabilities {
    /// Command-driven desktop capabilities built from `config`.
    #[must_use]
    pub fn desktop(config: &Config) -> Self {
        Self {
            capture: Box::new(CommandCapture::new(&config.capture, config.recordings_dir())),
            playback: Box::new(CommandPlayback::new(&config.playback)),
            share_sheet: Box::new(DirectoryShare::new(&config.share)),
            opener: Box::new(CommandOpener::new(&config.share)),
        }
    }
}

/// The voice memo application.
#[derive(Debug)]
pub struct App {
    config: Config,
    credentials: CredentialStore,
    sessions: SessionManager,
    profiles: ProfileStore,
    library: RecordingLibrary,
    recorder: Recorder,
    player: Player,
    sharer: Sharer,
    screen: Screen,
}

impl App {
    /// Build the application over `store`.
    ///
    /// Opens on the recording screen when a session was persisted, on the
    /// login screen otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the session marker cannot be read.
    pub fn new(
        config: Config,
        store: Arc<dyn PersistentStore>,
        capabilities: Capabilities,
    ) -> Result<Self> {
        let credentials = CredentialStore::new(Arc::clone(&store));
        let profiles = ProfileStore::new(Arc::clone(&store));
        let library = RecordingLibrary::new(Arc::clone(&store));
        let sessions = SessionManager::new(store, credentials.clone(), profiles.clone());

        let screen = if sessions.current()?.is_some() {
            Screen::Recording
        } else {
            Screen::Login
        };

        let Capabilities {
            capture,
            playback,
            share_sheet,
            opener,
        } = capabilities;

        Ok(Self {
            recorder: Recorder::new(
                capture,
                library.clone(),
                config.capture.default_name_prefix.clone(),
            ),
            player: Player::new(playback),
            sharer: Sharer::new(share_sheet, opener, config.share.clone()),
            config,
            credentials,
            sessions,
            profiles,
            library,
            screen,
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The screen currently shown.
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Switch between the register and login screens.
    ///
    /// Requests for the recording screen are ignored; only a login gets there.
    pub fn navigate(&mut self, screen: Screen) {
        if screen == Screen::Recording {
            warn!("Ignoring navigation to the recording screen without login");
            return;
        }
        self.screen = screen;
    }

    /// Register a new user.
    ///
    /// Both success and a taken email lead to the login screen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateUser`], [`Error::InvalidInput`], or a
    /// storage error.
    pub fn register(&mut self, form: NewUser) -> Result<Notice> {
        match self.credentials.register(form) {
            Ok(_) => {
                self.screen = Screen::Login;
                Ok(Notice::Registered)
            }
            Err(e @ Error::DuplicateUser { .. }) => {
                self.screen = Screen::Login;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Log in and show the recording screen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`] on mismatch, or a storage error.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Notice> {
        self.sessions.login(email, password)?;
        self.screen = Screen::Recording;
        Ok(Notice::LoggedIn)
    }

    /// End the session, stop any playback and show the login screen.
    ///
    /// A running capture is stopped first and saved to the outgoing user's
    /// list.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be cleared.
    pub async fn logout(&mut self) -> Result<()> {
        if self.recorder.is_recording() {
            match self.recorder.stop(None).await {
                Ok(recording) => {
                    info!(id = %recording.id, "Saved recording interrupted by logout");
                }
                Err(e) => error!(error = %e, "Failed to save recording interrupted by logout"),
            }
        }
        self.player.release().await;
        self.sessions.logout()?;
        self.screen = Screen::Login;
        Ok(())
    }

    /// The logged-in user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a session.
    pub fn current_user(&self) -> Result<User> {
        self.sessions.current_user()
    }

    /// The session user's recordings, optionally filtered by date text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a session, or a storage error.
    pub fn recordings(&self, query: Option<&str>) -> Result<Vec<Recording>> {
        let email = self.sessions.require()?;
        match query {
            Some(query) => self.library.search(&email, query),
            None => self.library.list(&email),
        }
    }

    /// Whether a capture is running.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Time spent in the running capture.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.recorder.elapsed()
    }

    /// Start capturing audio.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a session,
    /// [`Error::PermissionDenied`] if the microphone is refused, or a capture
    /// error.
    pub async fn start_recording(&mut self) -> Result<()> {
        let email = self.sessions.require()?;
        self.recorder.start(&email).await
    }

    /// Stop capturing and save the recording under `name` to the list of the
    /// user who started it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRecording`] when idle, or a capture or storage
    /// error.
    pub async fn stop_recording(&mut self, name: Option<&str>) -> Result<Recording> {
        self.sessions.require()?;
        let recording = self.recorder.stop(name).await?;
        info!(id = %recording.id, duration = recording.duration, "Saved recording");
        Ok(recording)
    }

    /// Start when idle, stop and save when recording.
    ///
    /// # Errors
    ///
    /// See [`App::start_recording`] and [`App::stop_recording`].
    pub async fn toggle_recording(&mut self, name: Option<&str>) -> Result<Option<Recording>> {
        let email = self.sessions.require()?;
        self.recorder.toggle(&email, name).await
    }

    fn find(&self, id: &str) -> Result<Recording> {
        let email = self.sessions.require()?;
        self.library
            .get(&email, id)?
            .ok_or_else(|| Error::RecordingNotFound { id: id.to_string() })
    }

    /// Play the recording with `id`, replacing anything already playing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordingNotFound`] for an unknown id, or the
    /// playback error.
    pub async fn play(&mut self, id: &str) -> Result<()> {
        let recording = self.find(id)?;
        self.player
            .play(&recording)
            .await
            .inspect_err(|e| error!(id, error = %e, "Failed to play recording"))
    }

    /// Wait for the current sound to finish and release it.
    ///
    /// # Errors
    ///
    /// Returns the playback error if the sound ended abnormally.
    pub async fn wait_for_playback(&mut self) -> Result<()> {
        self.player
            .finish()
            .await
            .inspect_err(|e| error!(error = %e, "Playback ended abnormally"))
    }

    /// Stop and release the current sound.
    pub async fn stop_playback(&mut self) {
        self.player.release().await;
    }

    /// Delete the recording with `id`. Unknown ids are a no-op.
    ///
    /// Returns whether a recording was removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a session, or a storage error.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let email = self.sessions.require()?;
        self.library
            .remove(&email, id)
            .inspect_err(|e| error!(id, error = %e, "Failed to delete recording"))
    }

    /// Share the recording with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordingNotFound`] for an unknown id,
    /// [`Error::ShareUnavailable`] without a share surface, or the share
    /// error.
    pub async fn share(&self, id: &str) -> Result<()> {
        let recording = self.find(id)?;
        self.sharer
            .share(&recording)
            .await
            .inspect_err(|e| error!(id, error = %e, "Failed to share recording"))
    }

    /// Open the Drive link.
    ///
    /// # Errors
    ///
    /// Returns the opener's error.
    pub async fn upload_to_drive(&self) -> Result<()> {
        self.sharer
            .export_to_drive()
            .await
            .inspect_err(|e| error!(error = %e, "Failed to open Drive"))
    }

    /// The session user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a session, or a storage error.
    pub fn profile(&self) -> Result<Profile> {
        let email = self.sessions.require()?;
        self.profiles.load(&email)
    }

    /// Save the session user's profile names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteProfile`] if either name is blank or there
    /// is no session, or a storage error.
    pub fn save_profile(&self, first_name: &str, last_name: &str) -> Result<Notice> {
        let profile = Profile {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        if !profile.is_complete() {
            return Err(Error::IncompleteProfile);
        }

        let email = match self.sessions.require() {
            Err(Error::NotLoggedIn) => return Err(Error::IncompleteProfile),
            other => other?,
        };
        self.profiles.save(&email, &profile)?;
        Ok(Notice::ProfileUpdated)
    }
}
