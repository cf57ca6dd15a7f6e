//! `vmemo` - CLI for voicememo
//!
//! Each invocation opens the store, restores the persisted session and runs
//! one action against it.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use voicememo::cli::{
    Cli, Command, ConfigCommand, ListCommand, ProfileCommand, RecordCommand,
};
use voicememo::platform::platform_name;
use voicememo::{init_logging, App, Capabilities, Config, Notice, Recording, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Config commands must work even when the configuration is broken
    if let Command::Config(cmd) = cli.command {
        return handle_config(cli.config, cmd);
    }

    let config = Config::load_from(cli.config.clone())?;
    let store = Arc::new(
        SqliteStore::open(config.database_path())
            .with_context(|| format!("opening {}", config.database_path().display()))?,
    );

    if let Command::Status(flag) = &cli.command {
        return handle_status(&config, &store, flag.json);
    }

    let capabilities = Capabilities::desktop(&config);
    let mut app = App::new(config, store, capabilities)?;

    match cli.command {
        Command::Register(cmd) => report(app.register(cmd.into())),
        Command::Login(cmd) => report(app.login(&cmd.email, &cmd.password)),
        Command::Logout => {
            app.logout().await?;
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami(flag) => handle_whoami(&app, flag.json),
        Command::Record(cmd) => handle_record(&mut app, cmd).await,
        Command::List(cmd) => handle_list(&app, &cmd),
        Command::Play(arg) => {
            app.play(&arg.id).await?;
            println!("Playing {}... (Ctrl-C to stop)", arg.id);
            let interrupted = tokio::select! {
                result = app.wait_for_playback() => {
                    result?;
                    false
                }
                _ = tokio::signal::ctrl_c() => true,
            };
            if interrupted {
                app.stop_playback().await;
            }
            Ok(())
        }
        Command::Delete(arg) => {
            if app.delete(&arg.id)? {
                println!("Deleted {}.", arg.id);
            } else {
                println!("No recording with id {}.", arg.id);
            }
            Ok(())
        }
        Command::Share(arg) => {
            app.share(&arg.id).await?;
            println!("Shared {}.", arg.id);
            Ok(())
        }
        Command::Drive => {
            app.upload_to_drive().await?;
            println!("Opened {}", app.config().share.drive_url);
            Ok(())
        }
        Command::Profile(cmd) => handle_profile(&app, cmd),
        Command::Status(_) | Command::Config(_) => Ok(()),
    }
}

/// Print the outcome of an action that reports a notice.
fn report(result: voicememo::Result<Notice>) -> Result<()> {
    match result {
        Ok(notice) => {
            println!("{notice}");
            Ok(())
        }
        Err(e) => Err(user_facing(e)),
    }
}

/// Errors with a notice are reported by its text alone.
fn user_facing(e: voicememo::Error) -> anyhow::Error {
    match Notice::from_error(&e) {
        Some(notice) => anyhow::anyhow!("{notice}"),
        None => e.into(),
    }
}

fn handle_whoami(app: &App, json: bool) -> Result<()> {
    let user = app.current_user()?;
    let profile = app.profile()?;
    if json {
        let whoami = serde_json::json!({
            "email": user.email,
            "firstName": user.first_name,
            "lastName": user.last_name,
            "profile": profile,
        });
        println!("{}", serde_json::to_string_pretty(&whoami)?);
    } else {
        println!("{} {} <{}>", user.first_name, user.last_name, user.email);
        if profile.is_complete() {
            println!("Profile: {} {}", profile.first_name, profile.last_name);
        }
    }
    Ok(())
}

fn handle_status(config: &Config, store: &SqliteStore, json: bool) -> Result<()> {
    let stats = store.stats()?;
    let recording_lists = store.keys("recordings.")?.len();
    if json {
        let status = serde_json::json!({
            "platform": platform_name(),
            "database_path": store.path(),
            "recordings_dir": config.recordings_dir(),
            "recording_lists": recording_lists,
            "storage": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("vmemo status");
        println!("------------");
        println!("Platform:      {}", platform_name());
        println!("Database:      {}", store.path().display());
        println!("Recordings:    {}", config.recordings_dir().display());
        println!("Entries:       {}", stats.total_entries);
        println!("User lists:    {recording_lists}");
        println!("Size:          {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

async fn handle_record(app: &mut App, cmd: RecordCommand) -> Result<()> {
    app.start_recording().await.map_err(user_facing)?;

    match cmd.seconds {
        Some(seconds) => {
            println!("Recording for {seconds}s... (Ctrl-C to stop early)");
            tokio::select! {
                () = tokio::time::sleep(Duration::from_secs(seconds)) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
        None => {
            println!("Recording... (Ctrl-C to stop)");
            tokio::signal::ctrl_c().await?;
        }
    }

    let recording = app.stop_recording(cmd.name.as_deref()).await?;
    println!(
        "Saved {} ({}) as {}",
        recording.name,
        recording.formatted_duration(),
        recording.id
    );
    Ok(())
}

fn handle_list(app: &App, cmd: &ListCommand) -> Result<()> {
    let recordings = app.recordings(cmd.search.as_deref())?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&recordings)?);
        return Ok(());
    }

    if recordings.is_empty() {
        println!("No recordings.");
        return Ok(());
    }
    for recording in &recordings {
        print_recording(recording);
    }
    Ok(())
}

fn print_recording(recording: &Recording) {
    println!(
        "{:<15} {:<24} {:>6}  {}",
        recording.id,
        recording.date,
        recording.formatted_duration(),
        recording.name
    );
}

fn handle_profile(app: &App, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Show { json } => {
            let profile = app.profile()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                println!("First name: {}", profile.first_name);
                println!("Last name:  {}", profile.last_name);
            }
            Ok(())
        }
        ProfileCommand::Set {
            first_name,
            last_name,
        } => report(app.save_profile(&first_name, &last_name)),
    }
}

fn handle_config(path: Option<std::path::PathBuf>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Capture]");
                println!(
                    "  Recorder:           {}",
                    config.capture.recorder_command.join(" ")
                );
                println!("  Recordings dir:     {}", config.recordings_dir().display());
                println!("  File extension:     {}", config.capture.file_extension);
                println!(
                    "  Name prefix:        {}",
                    config.capture.default_name_prefix
                );
                println!();
                println!("[Playback]");
                println!(
                    "  Player:             {}",
                    config.playback.player_command.join(" ")
                );
                println!();
                println!("[Share]");
                println!("  Mime type:          {}", config.share.mime_type);
                println!("  UTI:                {}", config.share.uti);
                match &config.share.share_dir {
                    Some(dir) => println!("  Share dir:          {}", dir.display()),
                    None => println!("  Share dir:          (sharing disabled)"),
                }
                println!("  Drive URL:          {}", config.share.drive_url);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.or(path).unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
