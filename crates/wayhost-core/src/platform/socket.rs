//! Readiness probing through the compositor's listening socket.

use crate::config::CompositorConfig;
use std::collections::HashSet;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::UnixStream;
use tracing::{debug, info, warn};

/// Names of Wayland sockets currently present in `runtime_dir`.
///
/// A missing directory has no sockets.
pub fn list_sockets(runtime_dir: &Path) -> io::Result<HashSet<OsString>> {
    let entries = match std::fs::read_dir(runtime_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => return Err(e),
    };

    let mut sockets = HashSet::new();
    for entry in entries {
        let name = entry?.file_name();
        if is_socket_name(&name) {
            sockets.insert(name);
        }
    }
    Ok(sockets)
}

fn is_socket_name(name: &OsString) -> bool {
    name.to_str()
        .map(|n| n.starts_with(CompositorConfig::SOCKET_PREFIX) && !n.ends_with(".lock"))
        .unwrap_or(false)
}

/// Wait until a socket not in `existing` appears in `runtime_dir` and accepts
/// a connection.
///
/// Returns `None` when the directory cannot be read; the caller then has no
/// way to observe readiness.
pub async fn wait_for_new_socket(
    runtime_dir: &Path,
    existing: &HashSet<OsString>,
    interval: Duration,
) -> Option<PathBuf> {
    info!(
        "Waiting for compositor socket in {}...",
        runtime_dir.display()
    );

    loop {
        let current = match list_sockets(runtime_dir) {
            Ok(current) => current,
            Err(e) => {
                warn!(
                    "Cannot watch {} for the compositor socket: {}",
                    runtime_dir.display(),
                    e
                );
                return None;
            }
        };

        for name in current.difference(existing) {
            let path = runtime_dir.join(name);
            match UnixStream::connect(&path).await {
                Ok(_) => {
                    info!("Compositor is accepting clients on {}", path.display());
                    return Some(path);
                }
                Err(e) => debug!("Socket {} not ready: {}", path.display(), e),
            }
        }

        tokio::time::sleep(interval).await;
    }
}
