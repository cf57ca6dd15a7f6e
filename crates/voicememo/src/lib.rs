//! `voicememo` - A personal voice memo recorder
//!
//! This library provides user accounts with a persisted login session,
//! microphone capture into a per-user recording list, and playback, sharing
//! and deletion of saved recordings. Platform services sit behind the traits
//! in [`capture`], [`playback`] and [`share`]; [`platform`] implements them
//! with external desktop commands.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
#[cfg(test)]
mod fakes;
pub mod logging;
pub mod platform;
pub mod playback;
pub mod profile;
pub mod recording;
pub mod session;
pub mod share;
pub mod storage;
pub mod user;

pub use app::{App, Capabilities, Notice, Screen};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use recording::{Recording, RecordingLibrary};
pub use storage::{MemoryStore, PersistentStore, SqliteStore, StorageStats};
pub use user::{NewUser, User};
