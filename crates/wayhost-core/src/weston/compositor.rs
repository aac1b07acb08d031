//! Process-backed implementation of the native compositor boundary.

use super::module_map::ModuleEnvironment;
use crate::config::WestonConfig;
use crate::error::{HostError, Result};
use crate::lifecycle::{LaunchRequest, NativeCompositor};
use crate::platform;
use async_trait::async_trait;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::{error, info, warn};

/// Runs the compositor as a child process built from the staged artifacts.
///
/// Readiness is reported once a new listening socket shows up in the runtime
/// directory and accepts a connection.
#[derive(Debug)]
pub struct WestonCompositor {
    config: WestonConfig,
    environment: OnceLock<ModuleEnvironment>,
    running: AtomicBool,
    pid: AtomicU32,
}

impl WestonCompositor {
    pub fn new(config: WestonConfig) -> Self {
        Self {
            config,
            environment: OnceLock::new(),
            running: AtomicBool::new(false),
            pid: AtomicU32::new(0),
        }
    }

    pub fn config(&self) -> &WestonConfig {
        &self.config
    }

    /// Module environment computed by `initialize`.
    pub fn environment(&self) -> Option<&ModuleEnvironment> {
        self.environment.get()
    }

    /// PID of the running compositor.
    pub fn pid(&self) -> Option<u32> {
        match self.pid.load(Ordering::Acquire) {
            0 => None,
            pid => Some(pid),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask the running compositor to shut down. The launch then resolves with
    /// its exit code.
    pub fn terminate(&self) -> Result<()> {
        let pid = self.pid().ok_or(HostError::NotRunning)?;
        info!("Stopping compositor (PID {})", pid);
        platform::request_termination(pid)
    }

    fn command(&self, args: &[String], environment: &ModuleEnvironment) -> Result<Command> {
        let (program_name, rest) = args.split_first().ok_or(HostError::EmptyArguments)?;

        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg0(program_name);
        cmd.args(rest);
        for (key, value) in environment.vars() {
            cmd.env(key, value);
        }

        if let Some(ref log_file) = self.config.log_file {
            if let Some(parent) = log_file.parent() {
                fs::create_dir_all(parent).map_err(|e| HostError::io_with_path(e, parent))?;
            }

            let file = fs::File::create(log_file).map_err(|e| HostError::Io {
                message: "create log file".to_string(),
                path: Some(log_file.clone()),
                source: Some(e),
            })?;
            let stdout_file = file.try_clone().map_err(|e| HostError::Io {
                message: "clone log file handle".to_string(),
                path: Some(log_file.clone()),
                source: Some(e),
            })?;
            cmd.stdout(Stdio::from(stdout_file));
            cmd.stderr(Stdio::from(file));
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }
        cmd.stdin(Stdio::null());

        Ok(cmd)
    }

    fn socket_snapshot(&self) -> HashSet<std::ffi::OsString> {
        let Some(ref dir) = self.config.runtime_dir else {
            return HashSet::new();
        };
        platform::list_sockets(dir).unwrap_or_else(|e| {
            warn!("Failed to list {}: {}", dir.display(), e);
            HashSet::new()
        })
    }

    fn spawn_error(&self, err: io::Error) -> HostError {
        if err.kind() == io::ErrorKind::NotFound {
            HostError::BinaryNotFound(self.config.binary_path.clone())
        } else {
            HostError::LaunchFailed {
                program: self.config.binary_path.display().to_string(),
                message: err.to_string(),
            }
        }
    }

    fn wait_error(&self, err: io::Error) -> HostError {
        HostError::LaunchFailed {
            program: self.config.binary_path.display().to_string(),
            message: format!("failed to wait for compositor: {}", err),
        }
    }
}

/// How the startup phase of a run ended.
enum Startup {
    Exited(io::Result<ExitStatus>),
    Ready(Option<PathBuf>),
}

/// Clears the running flag and PID when a run ends, however it ends.
struct RunGuard<'a> {
    compositor: &'a WestonCompositor,
}

impl<'a> RunGuard<'a> {
    fn acquire(compositor: &'a WestonCompositor) -> Result<Self> {
        if compositor.running.swap(true, Ordering::AcqRel) {
            return Err(HostError::AlreadyRunning);
        }
        Ok(Self { compositor })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.compositor.pid.store(0, Ordering::Release);
        self.compositor.running.store(false, Ordering::Release);
    }
}

#[async_trait]
impl NativeCompositor for WestonCompositor {
    type Error = HostError;

    fn initialize(&self) -> Result<()> {
        let environment = ModuleEnvironment::scan(&self.config.artifacts_dir)?;
        if let Some(ref map) = environment.module_map {
            info!("Compositor module map: {}", map);
        }
        if self.environment.set(environment).is_err() {
            warn!("Compositor module environment was already computed");
        }
        Ok(())
    }

    async fn run(&self, request: LaunchRequest) -> Result<i32> {
        let environment = self.environment.get().ok_or_else(|| HostError::Config {
            message: "compositor module used before initialize".to_string(),
        })?;
        let _guard = RunGuard::acquire(self)?;

        let (args, on_ready) = request.into_parts();
        let mut cmd = self.command(&args, environment)?;

        let existing_sockets = self.socket_snapshot();

        let mut child = cmd.spawn().map_err(|e| {
            error!("Failed to spawn compositor: {}", e);
            self.spawn_error(e)
        })?;

        if let Some(pid) = child.id() {
            self.pid.store(pid, Ordering::Release);
            info!("Launched compositor with PID {}", pid);
        }

        let status = match (on_ready, self.config.runtime_dir.as_deref()) {
            (Some(notifier), Some(runtime_dir)) => {
                let startup = tokio::select! {
                    status = child.wait() => Startup::Exited(status),
                    socket = platform::wait_for_new_socket(
                        runtime_dir,
                        &existing_sockets,
                        self.config.ready_poll_interval,
                    ) => Startup::Ready(socket),
                };

                match startup {
                    Startup::Exited(status) => {
                        warn!("Compositor exited before accepting clients");
                        status
                    }
                    Startup::Ready(socket) => {
                        match socket {
                            Some(_) => notifier.notify(),
                            None => drop(notifier),
                        }
                        child.wait().await
                    }
                }
            }
            (Some(notifier), None) => {
                warn!("No runtime directory to watch; readiness will not be reported");
                drop(notifier);
                child.wait().await
            }
            (None, _) => child.wait().await,
        }
        .map_err(|e| self.wait_error(e))?;

        Ok(platform::exit_code(status))
    }
}
