//! Process status and signalling for the compositor child.

use crate::error::{HostError, Result};
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use tracing::debug;

/// Shell convention for a process killed by a signal.
const SIGNAL_EXIT_BASE: i32 = 128;

/// Integer exit code of a terminated process.
///
/// A process killed by signal `n` reports `128 + n`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    match status.signal() {
        Some(signal) => SIGNAL_EXIT_BASE + signal,
        None => -1,
    }
}

/// Ask a process to shut down with SIGTERM.
pub fn request_termination(pid: u32) -> Result<()> {
    // Out-of-range values would wrap into process-group targets.
    let raw = i32::try_from(pid).map_err(|_| HostError::NotRunning)?;

    debug!("Sending SIGTERM to process {}", pid);
    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(HostError::NotRunning),
        Err(e) => Err(HostError::Other(format!(
            "Failed to send SIGTERM to {}: {}",
            pid, e
        ))),
    }
}
