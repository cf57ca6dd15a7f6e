//! Sharing recordings and the external "upload to Drive" link.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::ShareConfig;
use crate::error::{Error, Result};
use crate::recording::Recording;

/// Options passed to the share surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareOptions {
    /// Mime type of the shared file.
    pub mime_type: String,
    /// Title of the share dialog.
    pub dialog_title: String,
    /// Uniform type identifier of the shared file.
    pub uti: String,
}

/// Trait for the platform share surface.
#[async_trait]
pub trait ShareSheet: Send + Sync + std::fmt::Debug {
    /// Whether sharing is possible on this device.
    async fn is_available(&self) -> bool;

    /// Offer the file at `uri` to the share surface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShareFailure`] if the platform rejects the request.
    async fn share(&self, uri: &str, options: &ShareOptions) -> Result<()>;
}

/// Trait for launching external links.
#[async_trait]
pub trait UrlOpener: Send + Sync + std::fmt::Debug {
    /// Open `url` outside the application.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OpenUrl`] if the link could not be opened.
    async fn open_url(&self, url: &str) -> Result<()>;
}

/// Shares recordings and opens the Drive link.
#[derive(Debug)]
pub struct Sharer {
    sheet: Box<dyn ShareSheet>,
    opener: Box<dyn UrlOpener>,
    config: ShareConfig,
}

impl Sharer {
    /// Create a sharer.
    #[must_use]
    pub fn new(sheet: Box<dyn ShareSheet>, opener: Box<dyn UrlOpener>, config: ShareConfig) -> Self {
        Self {
            sheet,
            opener,
            config,
        }
    }

    /// Options used when sharing `recording`.
    #[must_use]
    pub fn options_for(&self, recording: &Recording) -> ShareOptions {
        ShareOptions {
            mime_type: self.config.mime_type.clone(),
            dialog_title: format!("Share {}", recording.name),
            uti: self.config.uti.clone(),
        }
    }

    /// Hand `recording` to the share surface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShareUnavailable`] without sharing when the platform
    /// has no share surface, or the share surface's error.
    pub async fn share(&self, recording: &Recording) -> Result<()> {
        if !self.sheet.is_available().await {
            warn!(id = %recording.id, "Sharing is not available on this device");
            return Err(Error::ShareUnavailable);
        }

        let options = self.options_for(recording);
        self.sheet.share(&recording.uri, &options).await?;
        info!(id = %recording.id, "Shared recording");
        Ok(())
    }

    /// Open the configured Drive link. Nothing is uploaded.
    ///
    /// # Errors
    ///
    /// Returns the opener's error.
    pub async fn export_to_drive(&self) -> Result<()> {
        self.opener.open_url(&self.config.drive_url).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::fakes::{FakeOpener, FakeShareSheet};

    fn recording() -> Recording {
        Recording {
            id: "1".to_string(),
            name: "standup".to_string(),
            uri: "file:///tmp/1.m4a".to_string(),
            date: "03/14/2024, 10:00:00".to_string(),
            duration: 3,
        }
    }

    fn sharer(available: bool) -> (Arc<Mutex<Vec<(String, ShareOptions)>>>, Arc<Mutex<Vec<String>>>, Sharer) {
        let sheet = FakeShareSheet {
            available,
            ..FakeShareSheet::default()
        };
        let opener = FakeOpener::default();
        let shared = sheet.shared.clone();
        let opened = opener.opened.clone();
        let sharer = Sharer::new(Box::new(sheet), Box::new(opener), ShareConfig::default());
        (shared, opened, sharer)
    }

    #[tokio::test]
    async fn test_share_when_available() {
        let (shared, _, sharer) = sharer(true);
        sharer.share(&recording()).await.unwrap();

        let shared = shared.lock().unwrap().clone();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].0, "file:///tmp/1.m4a");
        assert_eq!(
            shared[0].1,
            ShareOptions {
                mime_type: "audio/m4a".to_string(),
                dialog_title: "Share standup".to_string(),
                uti: "com.apple.m4a-audio".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_share_unavailable_is_noop() {
        let (shared, _, sharer) = sharer(false);

        assert!(matches!(
            sharer.share(&recording()).await,
            Err(Error::ShareUnavailable)
        ));
        assert!(shared.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_opens_drive_link() {
        let (_, opened, sharer) = sharer(true);
        sharer.export_to_drive().await.unwrap();

        assert_eq!(
            opened.lock().unwrap().clone(),
            vec!["https://drive.google.com/".to_string()]
        );
    }
}
