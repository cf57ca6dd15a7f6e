//! Configuration management for voicememo.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "voicememo";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "voicememo.db";

/// Subdirectory of the data dir holding captured audio.
const RECORDINGS_DIR_NAME: &str = "recordings";

/// Placeholder replaced with the capture output path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Placeholder replaced with the file to play.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Placeholder replaced with the link to open.
pub const URL_PLACEHOLDER: &str = "{url}";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `VOICEMEMO_`, sections split on `__`)
/// 2. TOML config file at `~/.config/voicememo/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Capture configuration.
    pub capture: CaptureConfig,
    /// Playback configuration.
    pub playback: PlaybackConfig,
    /// Share and export configuration.
    pub share: ShareConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/voicememo/voicememo.db`
    pub database_path: Option<PathBuf>,
}

/// Capture-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// External recorder invocation; `{output}` is replaced with the file path.
    pub recorder_command: Vec<String>,
    /// Directory receiving captured audio.
    /// Defaults to `~/.local/share/voicememo/recordings`
    pub recordings_dir: Option<PathBuf>,
    /// Extension of captured files.
    pub file_extension: String,
    /// Prefix of the generated name when none is given.
    pub default_name_prefix: String,
}

/// Playback-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// External player invocation; `{input}` is replaced with the file path.
    pub player_command: Vec<String>,
}

/// Share and export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Mime type announced to the share surface.
    pub mime_type: String,
    /// Uniform type identifier announced to the share surface.
    pub uti: String,
    /// Directory that shared recordings are copied into.
    /// Sharing is unavailable when unset.
    pub share_dir: Option<PathBuf>,
    /// Link opened by the "upload to Drive" action.
    pub drive_url: String,
    /// External link opener; `{url}` is replaced with the link.
    pub opener_command: Vec<String>,
}

fn command(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| (*p).to_string()).collect()
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let input: &[&str] = if cfg!(target_os = "macos") {
            &["-f", "avfoundation", "-i", ":0"]
        } else {
            &["-f", "pulse", "-i", "default"]
        };
        let mut recorder_command = command(&["ffmpeg", "-hide_banner", "-loglevel", "error"]);
        recorder_command.extend(command(input));
        recorder_command.extend(command(&["-y", OUTPUT_PLACEHOLDER]));

        Self {
            recorder_command,
            recordings_dir: None,
            file_extension: "m4a".to_string(),
            default_name_prefix: "Recording".to_string(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            player_command: command(&[
                "ffplay",
                "-nodisp",
                "-autoexit",
                "-loglevel",
                "error",
                INPUT_PLACEHOLDER,
            ]),
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        Self {
            mime_type: "audio/m4a".to_string(),
            uti: "com.apple.m4a-audio".to_string(),
            share_dir: None,
            drive_url: "https://drive.google.com/".to_string(),
            opener_command: command(&[opener, URL_PLACEHOLDER]),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("VOICEMEMO_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        require_placeholder(
            "capture.recorder_command",
            &self.capture.recorder_command,
            OUTPUT_PLACEHOLDER,
        )?;
        require_placeholder(
            "playback.player_command",
            &self.playback.player_command,
            INPUT_PLACEHOLDER,
        )?;
        require_placeholder(
            "share.opener_command",
            &self.share.opener_command,
            URL_PLACEHOLDER,
        )?;

        if self.capture.default_name_prefix.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "capture.default_name_prefix must not be empty".to_string(),
            });
        }

        let extension = Regex::new(r"^[A-Za-z0-9]+$").map_err(|e| Error::internal(e.to_string()))?;
        if !extension.is_match(&self.capture.file_extension) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "capture.file_extension must be alphanumeric: {}",
                    self.capture.file_extension
                ),
            });
        }

        let mime = Regex::new(r"^[a-z]+/[a-z0-9.+-]+$").map_err(|e| Error::internal(e.to_string()))?;
        if !mime.is_match(&self.share.mime_type) {
            return Err(Error::ConfigValidation {
                message: format!("invalid share.mime_type: {}", self.share.mime_type),
            });
        }

        let link = Regex::new(r"^https?://\S+$").map_err(|e| Error::internal(e.to_string()))?;
        if !link.is_match(&self.share.drive_url) {
            return Err(Error::ConfigValidation {
                message: format!("share.drive_url must be an http(s) link: {}", self.share.drive_url),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the recordings directory, resolving defaults if not set.
    #[must_use]
    pub fn recordings_dir(&self) -> PathBuf {
        self.capture
            .recordings_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(RECORDINGS_DIR_NAME))
    }
}

fn require_placeholder(field: &str, command: &[String], placeholder: &str) -> Result<()> {
    if command.is_empty() {
        return Err(Error::ConfigValidation {
            message: format!("{field} must not be empty"),
        });
    }
    if !command.iter().any(|part| part.contains(placeholder)) {
        return Err(Error::ConfigValidation {
            message: format!("{field} must contain {placeholder}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_capture_config() {
        let capture = CaptureConfig::default();

        assert_eq!(capture.file_extension, "m4a");
        assert_eq!(capture.default_name_prefix, "Recording");
        assert!(capture
            .recorder_command
            .iter()
            .any(|p| p == OUTPUT_PLACEHOLDER));
    }

    #[test]
    fn test_default_share_config() {
        let share = ShareConfig::default();

        assert_eq!(share.mime_type, "audio/m4a");
        assert_eq!(share.uti, "com.apple.m4a-audio");
        assert_eq!(share.drive_url, "https://drive.google.com/");
        assert!(share.share_dir.is_none());
    }

    #[test]
    fn test_validate_empty_recorder_command() {
        let mut config = Config::default();
        config.capture.recorder_command.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("capture.recorder_command"));
    }

    #[test]
    fn test_validate_missing_placeholder() {
        let mut config = Config::default();
        config.playback.player_command = vec!["aplay".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("{input}"));
    }

    #[test]
    fn test_validate_bad_mime_type() {
        let mut config = Config::default();
        config.share.mime_type = "m4a".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("mime_type"));
    }

    #[test]
    fn test_validate_bad_drive_url() {
        let mut config = Config::default();
        config.share.drive_url = "drive.google.com".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("drive_url"));
    }

    #[test]
    fn test_validate_bad_extension() {
        let mut config = Config::default();
        config.capture.file_extension = ".m4a".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config
            .database_path()
            .to_string_lossy()
            .contains("voicememo.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_recordings_dir_default() {
        let config = Config::default();
        assert!(config.recordings_dir().ends_with("recordings"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("voicememo"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[share]\ndrive_url = \"https://example.com/upload\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.share.drive_url, "https://example.com/upload");
        assert_eq!(config.share.mime_type, "audio/m4a");
    }

    #[test]
    fn test_share_config_deserialize() {
        let json = r#"{"share_dir": "/tmp/outbox"}"#;
        let share: ShareConfig = serde_json::from_str(json).unwrap();
        assert_eq!(share.share_dir, Some(PathBuf::from("/tmp/outbox")));
        assert_eq!(share.uti, "com.apple.m4a-audio");
    }
}
