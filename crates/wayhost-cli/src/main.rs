//! wayhost - stage compositor artifacts and launch the kiosk session.
//!
//! `wayhost stage` is the post-build packaging step; `wayhost launch` starts
//! the compositor from the staged artifacts and exits with its exit code.

#[cfg(unix)]
mod launch;
mod stage;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use wayhost::HostError;

#[derive(Parser, Debug)]
#[command(name = "wayhost")]
#[command(about = "Stage and launch the kiosk Wayland compositor")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy built modules from the install tree into the artifacts directory
    Stage(stage::StageArgs),
    /// Start the compositor from the artifacts directory
    #[cfg(unix)]
    Launch(launch::LaunchArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays free for reports.
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Stage(stage_args) => stage::run(stage_args).await,
        #[cfg(unix)]
        Command::Launch(launch_args) => launch::run(launch_args).await,
    }
}

/// Project root: the given path, or the current directory.
fn project_root(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => Ok(std::env::current_dir()?),
    }
}

/// Log a terminal failure and its follow-up hint.
fn report_failure(err: &HostError) -> ExitCode {
    error!("ERROR: {}", err);
    if let Some(hint) = err.hint() {
        error!("{}", hint);
    }
    if err.is_precondition() {
        info!("Nothing was written.");
    }
    ExitCode::FAILURE
}
