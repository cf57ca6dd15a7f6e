//! Desktop share surface and link opener.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{build_command, uri_to_path};
use crate::config::{ShareConfig, URL_PLACEHOLDER};
use crate::error::{Error, Result};
use crate::share::{ShareOptions, ShareSheet, UrlOpener};

/// Shares by copying the recording into an outbox directory.
#[derive(Debug, Clone)]
pub struct DirectoryShare {
    dir: Option<PathBuf>,
}

impl DirectoryShare {
    /// Create a share surface for the configured outbox.
    #[must_use]
    pub fn new(config: &ShareConfig) -> Self {
        Self {
            dir: config.share_dir.clone(),
        }
    }
}

#[async_trait]
impl ShareSheet for DirectoryShare {
    async fn is_available(&self) -> bool {
        match &self.dir {
            Some(dir) => tokio::fs::metadata(dir)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false),
            None => false,
        }
    }

    async fn share(&self, uri: &str, options: &ShareOptions) -> Result<()> {
        let failure = |message: String| Error::ShareFailure {
            uri: uri.to_string(),
            message,
        };

        let dir = self
            .dir
            .as_ref()
            .ok_or_else(|| failure("no share directory configured".to_string()))?;
        let source = uri_to_path(uri);
        let file_name = source
            .file_name()
            .ok_or_else(|| failure("not a file".to_string()))?;
        let target = dir.join(file_name);

        tokio::fs::copy(&source, &target)
            .await
            .map_err(|e| failure(e.to_string()))?;

        info!(
            path = %target.display(),
            mime_type = %options.mime_type,
            uti = %options.uti,
            "{}",
            options.dialog_title
        );
        Ok(())
    }
}

/// Opens links with the configured desktop opener.
#[derive(Debug, Clone)]
pub struct CommandOpener {
    command: Vec<String>,
}

impl CommandOpener {
    /// Create an opener.
    #[must_use]
    pub fn new(config: &ShareConfig) -> Self {
        Self {
            command: config.opener_command.clone(),
        }
    }
}

#[async_trait]
impl UrlOpener for CommandOpener {
    async fn open_url(&self, url: &str) -> Result<()> {
        let mut command = build_command(&self.command, URL_PLACEHOLDER, url)?;
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let status = command.status().await.map_err(|e| Error::OpenUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        if !status.success() {
            return Err(Error::OpenUrl {
                url: url.to_string(),
                message: format!("opener exited with {status}"),
            });
        }

        debug!(url, "Opened link");
        Ok(())
    }
}
