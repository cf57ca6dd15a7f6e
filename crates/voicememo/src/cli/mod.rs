//! Command-line interface for voicememo.
//!
//! This module provides the CLI structure and command handlers for the
//! `vmemo` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, JsonFlag, ListCommand, LoginCommand, ProfileCommand, RecordCommand,
    RecordingArg, RegisterCommand,
};

/// vmemo - Record and keep voice memos
///
/// Register an account, log in, and record audio memos that are kept in a
/// per-user list you can search, play back, share or delete.
#[derive(Debug, Parser)]
#[command(name = "vmemo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account
    Register(RegisterCommand),

    /// Log in
    Login(LoginCommand),

    /// Log out and clear the profile
    Logout,

    /// Show the logged-in user
    Whoami(JsonFlag),

    /// Show storage and platform status
    Status(JsonFlag),

    /// Record a memo until Ctrl-C
    Record(RecordCommand),

    /// List recordings
    List(ListCommand),

    /// Play a recording
    Play(RecordingArg),

    /// Delete a recording
    Delete(RecordingArg),

    /// Share a recording
    Share(RecordingArg),

    /// Open Google Drive to upload recordings
    Drive,

    /// View or modify profile names
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Logout,
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "vmemo");
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;

        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_register() {
        let args = vec![
            "vmemo",
            "register",
            "--first-name",
            "Ada",
            "--last-name",
            "Lovelace",
            "--email",
            "ada@example.com",
            "--password",
            "engine",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Register(cmd) = cli.command else {
            panic!("expected register");
        };
        assert_eq!(cmd.last_name, "Lovelace");
        assert_eq!(cmd.password, "engine");
    }

    #[test]
    fn test_parse_register_requires_fields() {
        let args = vec!["vmemo", "register", "--email", "ada@example.com"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_record() {
        let args = vec!["vmemo", "record", "--name", "standup", "--seconds", "30"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Record(cmd) = cli.command else {
            panic!("expected record");
        };
        assert_eq!(cmd.name.as_deref(), Some("standup"));
        assert_eq!(cmd.seconds, Some(30));
    }

    #[test]
    fn test_parse_list_search() {
        let args = vec!["vmemo", "list", "--search", "03/14", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::List(cmd) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(cmd.search.as_deref(), Some("03/14"));
        assert!(cmd.json);
    }

    #[test]
    fn test_parse_play() {
        let args = vec!["vmemo", "play", "1710410400000"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Play(RecordingArg { ref id }) if id == "1710410400000"));
    }

    #[test]
    fn test_parse_profile_set() {
        let args = vec![
            "vmemo",
            "profile",
            "set",
            "--first-name",
            "Ada",
            "--last-name",
            "King",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Profile(ProfileCommand::Set { .. })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["vmemo", "-c", "/custom/config.toml", "list"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let args = vec!["vmemo", "-vv", "drive"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_with_quiet() {
        let args = vec!["vmemo", "-q", "logout"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.quiet);
    }
}
