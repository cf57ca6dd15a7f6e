//! Desktop implementations of the capability traits.
//!
//! Each capability shells out to a configurable external program: a recorder
//! for capture, a player for playback and the desktop link opener. Sharing
//! copies the file into a configured outbox directory.

mod capture;
mod playback;
mod share;

use std::path::{Path, PathBuf};

use tokio::process::Command;

pub use capture::CommandCapture;
pub use playback::CommandPlayback;
pub use share::{CommandOpener, DirectoryShare};

use crate::error::{Error, Result};

const FILE_SCHEME: &str = "file://";

/// Get platform name.
#[must_use]
pub fn platform_name() -> &'static str {
    if cfg!(target_os = "macos") {
        "macOS"
    } else if cfg!(target_os = "linux") {
        "Linux"
    } else {
        std::env::consts::OS
    }
}

/// `file://` URI for a local path.
#[must_use]
pub fn path_to_uri(path: &Path) -> String {
    format!("{FILE_SCHEME}{}", path.display())
}

/// Local path named by a `file://` URI; other strings are taken as paths.
#[must_use]
pub fn uri_to_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix(FILE_SCHEME).unwrap_or(uri))
}

/// Build a command from `template`, replacing `placeholder` with `value`.
fn build_command(template: &[String], placeholder: &str, value: &str) -> Result<Command> {
    let (program, args) = template.split_first().ok_or_else(|| Error::ConfigValidation {
        message: "external command must not be empty".to_string(),
    })?;

    let mut command = Command::new(program.replace(placeholder, value));
    command.args(args.iter().map(|arg| arg.replace(placeholder, value)));
    Ok(command)
}
