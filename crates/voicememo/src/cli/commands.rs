//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Given name
    #[arg(long)]
    pub first_name: String,

    /// Family name
    #[arg(long)]
    pub last_name: String,

    /// Email address used to log in
    #[arg(short, long)]
    pub email: String,

    /// Password
    #[arg(short, long)]
    pub password: String,
}

impl From<RegisterCommand> for crate::user::NewUser {
    fn from(cmd: RegisterCommand) -> Self {
        Self {
            first_name: cmd.first_name,
            last_name: cmd.last_name,
            email: cmd.email,
            password: cmd.password,
        }
    }
}

/// Login command arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Email address
    #[arg(short, long)]
    pub email: String,

    /// Password
    #[arg(short, long)]
    pub password: String,
}

/// Arguments for commands that only offer JSON output.
#[derive(Debug, Args)]
pub struct JsonFlag {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Record command arguments.
#[derive(Debug, Args)]
pub struct RecordCommand {
    /// Name for the recording (defaults to "Recording-<timestamp>")
    #[arg(short, long)]
    pub name: Option<String>,

    /// Stop automatically after this many seconds
    #[arg(short, long, value_name = "N")]
    pub seconds: Option<u64>,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show recordings whose date contains this text (e.g. "03/14")
    #[arg(short, long, value_name = "QUERY")]
    pub search: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Arguments naming one recording.
#[derive(Debug, Args)]
pub struct RecordingArg {
    /// Recording id, as shown by `list`
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Profile commands.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the profile names
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Update the profile names
    Set {
        /// Given name
        #[arg(long)]
        first_name: String,

        /// Family name
        #[arg(long)]
        last_name: String,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::NewUser;

    #[test]
    fn test_register_into_new_user() {
        let cmd = RegisterCommand {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "engine".to_string(),
        };

        let form = NewUser::from(cmd);
        assert_eq!(form.first_name, "Ada");
        assert_eq!(form.email, "ada@example.com");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_record_command_debug() {
        let cmd = RecordCommand {
            name: Some("standup".to_string()),
            seconds: Some(30),
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("standup"));
        assert!(debug_str.contains("30"));
    }

    #[test]
    fn test_profile_command_debug() {
        let cmd = ProfileCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
