//! `wayhost launch`: run the compositor from the staged artifacts.

use crate::{project_root, report_failure};
use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{error, info, warn};
use wayhost::{CompositorConfig, StagingConfig, WaylandRuntime, WestonCompositor, WestonConfig};

#[derive(clap::Args, Debug)]
pub struct LaunchArgs {
    /// Project root holding artifacts/ (defaults to the current directory)
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Directory with the staged artifacts (defaults to <project-root>/artifacts)
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,

    /// Compositor executable
    #[arg(long, default_value = CompositorConfig::PROGRAM_NAME)]
    weston_bin: PathBuf,

    /// Write compositor output to a timestamped log file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Client command to start once the compositor accepts connections
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "CMD")]
    on_ready: Vec<String>,
}

pub async fn run(args: LaunchArgs) -> Result<ExitCode> {
    let root = project_root(args.project_root)?;
    let artifacts_dir = args
        .artifacts_dir
        .unwrap_or_else(|| StagingConfig::artifacts_dir(&root));

    let mut config = WestonConfig::new(&artifacts_dir).with_binary(&args.weston_bin);
    if let Some(log_dir) = args.log_dir {
        let log_file = log_dir.join(format!(
            "weston-{}.log",
            Utc::now().format("%Y%m%d-%H%M%S")
        ));
        info!("Compositor log: {}", log_file.display());
        config = config.with_log_file(log_file);
    }

    let runtime = match WaylandRuntime::start(WestonCompositor::new(config)) {
        Ok(runtime) => runtime,
        Err(err) => return Ok(report_failure(&err)),
    };

    // Forward Ctrl-C to the compositor; the launch then settles with its code.
    let compositor = Arc::clone(runtime.native());
    let signal_forwarder = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received, stopping compositor");
            if let Err(e) = compositor.terminate() {
                warn!("Failed to stop compositor: {}", e);
            }
        }
    });

    let client = args.on_ready;
    let result = runtime
        .launch_with_callback(Some(move || start_client(&client)))
        .await;
    signal_forwarder.abort();

    match result {
        Ok(code) => {
            info!("exit: {}", code);
            Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
        }
        Err(err) => Ok(report_failure(&err)),
    }
}

/// Start the ready-time client, if one was given. It is not waited on.
fn start_client(command: &[String]) {
    info!("Compositor is ready");

    let Some((program, args)) = command.split_first() else {
        return;
    };

    match Command::new(program).args(args).spawn() {
        Ok(child) => info!(
            "Started client {} (PID {})",
            program,
            child.id().map(|p| p.to_string()).unwrap_or_default()
        ),
        Err(e) => error!("Failed to start client {}: {}", program, e),
    }
}
