//! Error types for voicememo.
//!
//! This module defines all error types used throughout the voicememo crate,
//! providing detailed context for debugging and user-facing notices.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for voicememo operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Account Errors ===
    /// A user with this email is already registered.
    #[error("user already exists: {email}")]
    DuplicateUser {
        /// The email that is already taken.
        email: String,
    },

    /// No registered user matches the supplied email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The operation needs a logged-in user.
    #[error("no user is logged in")]
    NotLoggedIn,

    /// A form field failed validation.
    #[error("invalid {field}: {message}")]
    InvalidInput {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the validation failure.
        message: String,
    },

    /// A profile save was attempted with missing names.
    #[error("profile is incomplete: first and last name are required")]
    IncompleteProfile,

    /// The session user has no recording with this id.
    #[error("no recording with id {id}")]
    RecordingNotFound {
        /// The id that was looked up.
        id: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A lock guarding persisted state was poisoned by a panicking writer.
    #[error("storage lock poisoned: {0}")]
    StorageLock(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Capture Errors ===
    /// Microphone access was not granted.
    #[error("microphone permission denied")]
    PermissionDenied,

    /// A capture is already in progress.
    #[error("a recording is already in progress")]
    AlreadyRecording,

    /// Stop was requested while no capture is in progress.
    #[error("no recording is in progress")]
    NotRecording,

    /// The capture device failed to start.
    #[error("failed to start capture: {message}")]
    CaptureStart {
        /// Description of what went wrong.
        message: String,
    },

    /// The capture device failed to stop or produce a resource.
    #[error("failed to finalize capture: {message}")]
    CaptureStop {
        /// Description of what went wrong.
        message: String,
    },

    // === Playback and Sharing Errors ===
    /// Loading or playing a sound failed.
    #[error("playback failed for {uri}: {message}")]
    PlaybackFailure {
        /// The resource that could not be played.
        uri: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The platform reports no share surface.
    #[error("sharing is not available on this device")]
    ShareUnavailable,

    /// The share surface accepted the request but failed.
    #[error("failed to share {uri}: {message}")]
    ShareFailure {
        /// The resource that was being shared.
        uri: String,
        /// Description of what went wrong.
        message: String,
    },

    /// An external link could not be opened.
    #[error("failed to open {url}: {message}")]
    OpenUrl {
        /// The link that was being opened.
        url: String,
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for voicememo operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an input validation error for the named field.
    #[must_use]
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Create a capture start error.
    #[must_use]
    pub fn capture_start(message: impl Into<String>) -> Self {
        Self::CaptureStart {
            message: message.into(),
        }
    }

    /// Create a capture stop error.
    #[must_use]
    pub fn capture_stop(message: impl Into<String>) -> Self {
        Self::CaptureStop {
            message: message.into(),
        }
    }

    /// Create a playback error for the given resource.
    #[must_use]
    pub fn playback(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PlaybackFailure {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a missing microphone permission.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }

    /// Check if this error came from the persistence layer.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::StorageLock(_)
                | Self::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidCredentials;
        assert_eq!(err.to_string(), "invalid email or password");

        let err = Error::NotLoggedIn;
        assert_eq!(err.to_string(), "no user is logged in");
    }

    #[test]
    fn test_duplicate_user_display() {
        let err = Error::DuplicateUser {
            email: "a@x.com".to_string(),
        };
        assert!(err.to_string().contains("a@x.com"));
    }

    #[test]
    fn test_is_permission_error() {
        assert!(Error::PermissionDenied.is_permission_error());
        assert!(!Error::NotRecording.is_permission_error());
    }

    #[test]
    fn test_is_storage_error() {
        assert!(Error::StorageLock("poisoned".to_string()).is_storage_error());
        assert!(Error::DatabaseMigration {
            message: "bad".to_string()
        }
        .is_storage_error());
        assert!(!Error::ShareUnavailable.is_storage_error());
    }

    #[test]
    fn test_recording_not_found_display() {
        let err = Error::RecordingNotFound {
            id: "1710410400000".to_string(),
        };
        assert_eq!(err.to_string(), "no recording with id 1710410400000");
    }

    #[test]
    fn test_invalid_input_display() {
        let err = Error::invalid_input("email", "missing @");
        let msg = err.to_string();
        assert!(msg.contains("email"));
        assert!(msg.contains("missing @"));
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_capture_errors_display() {
        assert!(Error::capture_start("device busy")
            .to_string()
            .contains("device busy"));
        assert!(Error::capture_stop("no file")
            .to_string()
            .contains("finalize"));
    }

    #[test]
    fn test_playback_error_display() {
        let err = Error::playback("file:///tmp/a.m4a", "decoder missing");
        let msg = err.to_string();
        assert!(msg.contains("file:///tmp/a.m4a"));
        assert!(msg.contains("decoder missing"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
