//! In-memory capability fakes shared by the unit tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::capture::AudioCapture;
use crate::error::{Error, Result};
use crate::playback::{AudioPlayback, SoundHandle};
use crate::share::{ShareOptions, ShareSheet, UrlOpener};
use crate::storage::PersistentStore;

#[derive(Debug, Default)]
pub struct FakeCapture {
    pub permission: bool,
    pub fail_start: bool,
    pub fail_stop: bool,
    captures: usize,
}

impl FakeCapture {
    pub fn granted() -> Self {
        Self {
            permission: true,
            ..Self::default()
        }
    }

    pub fn denied() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AudioCapture for FakeCapture {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn request_permission(&self) -> Result<bool> {
        Ok(self.permission)
    }

    async fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(Error::capture_start("device busy"));
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<String> {
        if self.fail_stop {
            return Err(Error::capture_stop("disk full"));
        }
        self.captures += 1;
        Ok(format!("file:///fake/capture-{}.m4a", self.captures))
    }
}

/// Records every call so tests can assert on handle lifetimes.
#[derive(Debug, Default)]
pub struct PlaybackLog {
    pub loaded: Mutex<Vec<(SoundHandle, String)>>,
    pub played: Mutex<Vec<SoundHandle>>,
    pub unloaded: Mutex<Vec<SoundHandle>>,
}

impl PlaybackLog {
    /// Handles loaded and not yet unloaded.
    pub fn live(&self) -> Vec<SoundHandle> {
        let unloaded = self.unloaded.lock().unwrap().clone();
        self.loaded
            .lock()
            .unwrap()
            .iter()
            .map(|(h, _)| *h)
            .filter(|h| !unloaded.contains(h))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct FakePlayback {
    pub log: Arc<PlaybackLog>,
    pub fail_load: bool,
    next: AtomicU64,
}

impl FakePlayback {
    pub fn new(log: Arc<PlaybackLog>) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }
}

#[async_trait]
impl AudioPlayback for FakePlayback {
    async fn load(&self, uri: &str) -> Result<SoundHandle> {
        if self.fail_load {
            return Err(Error::playback(uri, "missing file"));
        }
        let handle = SoundHandle(self.next.fetch_add(1, Ordering::SeqCst));
        self.log
            .loaded
            .lock()
            .unwrap()
            .push((handle, uri.to_string()));
        Ok(handle)
    }

    async fn play(&self, sound: SoundHandle) -> Result<()> {
        self.log.played.lock().unwrap().push(sound);
        Ok(())
    }

    async fn unload(&self, sound: SoundHandle) -> Result<()> {
        self.log.unloaded.lock().unwrap().push(sound);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeShareSheet {
    pub available: bool,
    pub shared: Arc<Mutex<Vec<(String, ShareOptions)>>>,
}

#[async_trait]
impl ShareSheet for FakeShareSheet {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn share(&self, uri: &str, options: &ShareOptions) -> Result<()> {
        self.shared
            .lock()
            .unwrap()
            .push((uri.to_string(), options.clone()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeOpener {
    pub opened: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl UrlOpener for FakeOpener {
    async fn open_url(&self, url: &str) -> Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// A store that reads as empty and refuses every write.
#[derive(Debug, Default)]
pub struct ReadOnlyStore;

impl ReadOnlyStore {
    fn refuse(key: &str) -> Error {
        Error::StorageLock(format!("read-only store refused write to {key}"))
    }
}

impl PersistentStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> Result<()> {
        Err(Self::refuse(key))
    }

    fn remove(&self, key: &str) -> Result<()> {
        Err(Self::refuse(key))
    }

    fn update(
        &self,
        key: &str,
        _edit: &mut dyn FnMut(Option<&str>) -> Result<String>,
    ) -> Result<()> {
        Err(Self::refuse(key))
    }
}
