//! Capture through an external recorder process.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tokio::process::Child;
use tracing::{debug, info, warn};

use super::{build_command, path_to_uri};
use crate::capture::AudioCapture;
use crate::config::{CaptureConfig, OUTPUT_PLACEHOLDER};
use crate::error::{Error, Result};

/// How long the recorder gets to flush its output after being asked to quit.
const STOP_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct ActiveCapture {
    child: Child,
    path: PathBuf,
}

/// Records by running the configured recorder command until stopped.
///
/// Stopping writes `q` to the recorder's stdin (ffmpeg's quit key) and kills
/// it if it has not exited within a few seconds.
#[derive(Debug)]
pub struct CommandCapture {
    command: Vec<String>,
    dir: PathBuf,
    extension: String,
    active: Option<ActiveCapture>,
}

impl CommandCapture {
    /// Create a capture backend writing into `dir`.
    #[must_use]
    pub fn new(config: &CaptureConfig, dir: PathBuf) -> Self {
        Self {
            command: config.recorder_command.clone(),
            dir,
            extension: config.file_extension.clone(),
            active: None,
        }
    }
}

#[async_trait]
impl AudioCapture for CommandCapture {
    fn name(&self) -> &'static str {
        "command"
    }

    /// Desktop systems have no microphone prompt; access counts as granted
    /// when the recordings directory is writable.
    async fn request_permission(&self) -> Result<bool> {
        match tokio::fs::create_dir_all(&self.dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                warn!(dir = %self.dir.display(), "Recordings directory is not writable");
                Ok(false)
            }
            Err(source) => Err(Error::DirectoryCreate {
                path: self.dir.clone(),
                source,
            }),
        }
    }

    async fn start(&mut self) -> Result<()> {
        if self.active.is_some() {
            return Err(Error::AlreadyRecording);
        }

        let path = self.dir.join(format!(
            "{}.{}",
            Utc::now().timestamp_millis(),
            self.extension
        ));
        let mut command = build_command(
            &self.command,
            OUTPUT_PLACEHOLDER,
            &path.to_string_lossy(),
        )?;
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| {
                let program = self.command.first().map_or("recorder", String::as_str);
                Error::capture_start(format!("{program}: {e}"))
            })?;

        if let Some(status) = child.try_wait()? {
            return Err(Error::capture_start(format!(
                "recorder exited immediately with {status}"
            )));
        }

        info!(path = %path.display(), "Recorder process started");
        self.active = Some(ActiveCapture { child, path });
        Ok(())
    }

    async fn stop(&mut self) -> Result<String> {
        let ActiveCapture { mut child, path } = self.active.take().ok_or(Error::NotRecording)?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(b"q").await {
                debug!(error = %e, "Recorder did not accept quit key");
            }
        }

        match tokio::time::timeout(STOP_GRACE, child.wait()).await {
            Ok(status) => {
                debug!(status = %status?, "Recorder exited");
            }
            Err(_) => {
                warn!("Recorder did not exit in time, killing it");
                child.kill().await?;
            }
        }

        let size = tokio::fs::metadata(&path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if size == 0 {
            return Err(Error::capture_stop(format!(
                "recorder produced no audio at {}",
                path.display()
            )));
        }

        Ok(path_to_uri(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_permission_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("recordings");
        let capture = CommandCapture::new(&CaptureConfig::default(), target.clone());

        assert!(capture.request_permission().await.unwrap());
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_stop_without_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = CommandCapture::new(&CaptureConfig::default(), dir.path().to_path_buf());

        assert!(matches!(capture.stop().await, Err(Error::NotRecording)));
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let config = CaptureConfig {
            recorder_command: vec![
                "voicememo-no-such-recorder".to_string(),
                OUTPUT_PLACEHOLDER.to_string(),
            ],
            ..CaptureConfig::default()
        };
        let mut capture = CommandCapture::new(&config, dir.path().to_path_buf());

        assert!(matches!(
            capture.start().await,
            Err(Error::CaptureStart { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_record_with_shell_command() {
        let dir = tempfile::tempdir().unwrap();
        let config = CaptureConfig {
            recorder_command: vec![
                "sh".to_string(),
                "-c".to_string(),
                format!("printf audio > '{OUTPUT_PLACEHOLDER}'; read _"),
            ],
            ..CaptureConfig::default()
        };
        let mut capture = CommandCapture::new(&config, dir.path().to_path_buf());

        capture.start().await.unwrap();
        let uri = capture.stop().await.unwrap();

        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with(".m4a"));
        let written = std::fs::read_to_string(crate::platform::uri_to_path(&uri)).unwrap();
        assert_eq!(written, "audio");
    }
}
