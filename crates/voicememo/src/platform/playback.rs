//! Playback through an external player process.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::process::Child;
use tracing::debug;

use super::{build_command, uri_to_path};
use crate::config::{PlaybackConfig, INPUT_PLACEHOLDER};
use crate::error::{Error, Result};
use crate::playback::{AudioPlayback, SoundHandle};

#[derive(Debug)]
struct LoadedSound {
    uri: String,
    path: PathBuf,
    child: Option<Child>,
}

/// Plays files by running the configured player command.
#[derive(Debug)]
pub struct CommandPlayback {
    command: Vec<String>,
    next: AtomicU64,
    sounds: Mutex<HashMap<u64, LoadedSound>>,
}

impl CommandPlayback {
    /// Create a playback backend.
    #[must_use]
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            command: config.player_command.clone(),
            next: AtomicU64::new(1),
            sounds: Mutex::default(),
        }
    }

    fn sounds(&self) -> Result<MutexGuard<'_, HashMap<u64, LoadedSound>>> {
        self.sounds
            .lock()
            .map_err(|_| Error::internal("playback registry lock poisoned"))
    }
}

#[async_trait]
impl AudioPlayback for CommandPlayback {
    async fn load(&self, uri: &str) -> Result<SoundHandle> {
        let path = uri_to_path(uri);
        if !tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Err(Error::playback(uri, "file not found"));
        }

        let id = self.next.fetch_add(1, Ordering::Relaxed);
        self.sounds()?.insert(
            id,
            LoadedSound {
                uri: uri.to_string(),
                path,
                child: None,
            },
        );
        Ok(SoundHandle(id))
    }

    async fn play(&self, sound: SoundHandle) -> Result<()> {
        let mut sounds = self.sounds()?;
        let loaded = sounds
            .get_mut(&sound.0)
            .ok_or_else(|| Error::playback(format!("{sound:?}"), "sound is not loaded"))?;

        let mut command = build_command(
            &self.command,
            INPUT_PLACEHOLDER,
            &loaded.path.to_string_lossy(),
        )?;
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| Error::playback(&loaded.uri, e.to_string()))?;
        debug!(uri = %loaded.uri, "Player process started");
        loaded.child = Some(child);
        Ok(())
    }

    async fn wait(&self, sound: SoundHandle) -> Result<()> {
        let (uri, child) = {
            let mut sounds = self.sounds()?;
            match sounds.get_mut(&sound.0) {
                Some(loaded) => (loaded.uri.clone(), loaded.child.take()),
                None => return Ok(()),
            }
        };

        let Some(mut child) = child else {
            return Ok(());
        };
        let status = child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::playback(uri, format!("player exited with {status}")))
        }
    }

    async fn unload(&self, sound: SoundHandle) -> Result<()> {
        let removed = self.sounds()?.remove(&sound.0);
        if let Some(LoadedSound {
            child: Some(mut child),
            ..
        }) = removed
        {
            // Already-exited players report an error here
            let _ = child.start_kill();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::path_to_uri;

    #[tokio::test]
    async fn test_load_missing_file() {
        let playback = CommandPlayback::new(&PlaybackConfig::default());

        assert!(matches!(
            playback.load("file:///nonexistent/memo.m4a").await,
            Err(Error::PlaybackFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_play_unknown_handle() {
        let playback = CommandPlayback::new(&PlaybackConfig::default());
        assert!(playback.play(SoundHandle(42)).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_play_and_wait_with_shell_command() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("memo.m4a");
        std::fs::write(&file, b"audio").unwrap();

        let config = PlaybackConfig {
            player_command: vec![
                "sh".to_string(),
                "-c".to_string(),
                format!("test -s '{INPUT_PLACEHOLDER}'"),
            ],
        };
        let playback = CommandPlayback::new(&config);

        let sound = playback.load(&path_to_uri(&file)).await.unwrap();
        playback.play(sound).await.unwrap();
        playback.wait(sound).await.unwrap();
        playback.unload(sound).await.unwrap();

        assert!(playback.sounds().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_player_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("memo.m4a");
        std::fs::write(&file, b"audio").unwrap();

        let config = PlaybackConfig {
            player_command: vec![
                "sh".to_string(),
                "-c".to_string(),
                format!("exit 3 # {INPUT_PLACEHOLDER}"),
            ],
        };
        let playback = CommandPlayback::new(&config);

        let sound = playback.load(&path_to_uri(&file)).await.unwrap();
        playback.play(sound).await.unwrap();
        assert!(matches!(
            playback.wait(sound).await,
            Err(Error::PlaybackFailure { .. })
        ));
    }
}
