//! `wayhost stage`: the packaging step.

use crate::{project_root, report_failure};
use anyhow::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use wayhost::{stage_install_tree, StagingConfig};

#[derive(clap::Args, Debug)]
pub struct StageArgs {
    /// Project root holding builddir/ and artifacts/ (defaults to the current directory)
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Install tree to collect from (defaults to <project-root>/builddir/install)
    #[arg(long)]
    install_dir: Option<PathBuf>,

    /// Distribution directory (defaults to <project-root>/artifacts)
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,

    /// Print a JSON report of the staged files on stdout
    #[arg(long)]
    json: bool,
}

pub async fn run(args: StageArgs) -> Result<ExitCode> {
    let root = project_root(args.project_root)?;
    let install_dir = args
        .install_dir
        .unwrap_or_else(|| StagingConfig::install_dir(&root));
    let artifacts_dir = args
        .artifacts_dir
        .unwrap_or_else(|| StagingConfig::artifacts_dir(&root));

    // Traversal and copies are blocking filesystem work.
    let outcome =
        tokio::task::spawn_blocking(move || stage_install_tree(&install_dir, &artifacts_dir))
            .await?;

    match outcome {
        Ok(report) => {
            if args.json {
                // Intentional stdout: machine-readable report
                println!("{}", report.to_json()?);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Ok(report_failure(&err)),
    }
}
