//! Centralized configuration for wayhost.
//!
//! Constants for the packaging layout and the fixed compositor launch, plus the
//! builder-style [`WestonConfig`] used by the process-backed compositor.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Packaging step layout.
pub struct StagingConfig;

impl StagingConfig {
    /// Install tree produced by `meson install`, relative to the project root.
    pub const INSTALL_DIR: &'static [&'static str] = &["builddir", "install"];
    /// Flat distribution directory, relative to the project root.
    pub const ARTIFACTS_DIR_NAME: &'static str = "artifacts";
    /// Native addon binary and shared object suffixes.
    pub const RECOGNIZED_SUFFIXES: &'static [&'static str] = &[".node", ".so"];

    /// Default install tree under `project_root`.
    pub fn install_dir(project_root: &Path) -> PathBuf {
        Self::INSTALL_DIR
            .iter()
            .fold(project_root.to_path_buf(), |path, part| path.join(part))
    }

    /// Default distribution directory under `project_root`.
    pub fn artifacts_dir(project_root: &Path) -> PathBuf {
        project_root.join(Self::ARTIFACTS_DIR_NAME)
    }

    /// Recognized suffixes as owned strings.
    pub fn recognized_suffixes() -> Vec<String> {
        Self::RECOGNIZED_SUFFIXES
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

/// Fixed compositor launch parameters.
pub struct CompositorConfig;

impl CompositorConfig {
    pub const PROGRAM_NAME: &'static str = "weston";
    pub const SHELL_ARG: &'static str = "--shell=kiosk";
    pub const XWAYLAND_ARG: &'static str = "--xwayland";

    pub const MODULE_MAP_ENV: &'static str = "WESTON_MODULE_MAP";
    pub const DATA_DIR_ENV: &'static str = "WESTON_DATA_DIR";
    pub const DATA_DIR_NAME: &'static str = "weston";
    /// Marker that selects loadable modules in the artifacts directory.
    pub const MODULE_MARKER: &'static str = ".so";

    /// Prefix of the listening sockets a Wayland compositor creates.
    pub const SOCKET_PREFIX: &'static str = "wayland-";
    pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// Argument list forwarded to the native entry point (argv[0] included).
    pub fn launch_args() -> Vec<String> {
        vec![
            Self::PROGRAM_NAME.to_string(),
            Self::SHELL_ARG.to_string(),
            Self::XWAYLAND_ARG.to_string(),
        ]
    }
}

/// Configuration for the process-backed compositor.
#[derive(Debug, Clone)]
pub struct WestonConfig {
    /// Directory holding the staged artifacts.
    pub artifacts_dir: PathBuf,
    /// Compositor executable.
    pub binary_path: PathBuf,
    /// Directory where the compositor creates its listening socket.
    pub runtime_dir: Option<PathBuf>,
    /// Path to write stdout/stderr logs.
    pub log_file: Option<PathBuf>,
    /// Interval between readiness probes.
    pub ready_poll_interval: Duration,
}

impl WestonConfig {
    /// Create a config with defaults for the given artifacts directory.
    pub fn new(artifacts_dir: impl AsRef<Path>) -> Self {
        Self {
            artifacts_dir: artifacts_dir.as_ref().to_path_buf(),
            binary_path: PathBuf::from(CompositorConfig::PROGRAM_NAME),
            runtime_dir: dirs::runtime_dir(),
            log_file: None,
            ready_poll_interval: CompositorConfig::READY_POLL_INTERVAL,
        }
    }

    /// Set the compositor executable.
    pub fn with_binary(mut self, path: impl AsRef<Path>) -> Self {
        self.binary_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the runtime directory to watch for the listening socket.
    pub fn with_runtime_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the log file path.
    pub fn with_log_file(mut self, path: impl AsRef<Path>) -> Self {
        self.log_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the readiness probe interval.
    pub fn with_ready_poll_interval(mut self, interval: Duration) -> Self {
        self.ready_poll_interval = interval;
        self
    }

    /// Data directory exported to the compositor.
    pub fn data_dir(&self) -> PathBuf {
        self.artifacts_dir.join(CompositorConfig::DATA_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_launch_args_are_fixed() {
        assert_eq!(
            CompositorConfig::launch_args(),
            vec!["weston", "--shell=kiosk", "--xwayland"]
        );
    }

    #[test]
    fn test_staging_layout() {
        let root = Path::new("/project");
        assert_eq!(
            StagingConfig::install_dir(root),
            PathBuf::from("/project/builddir/install")
        );
        assert_eq!(
            StagingConfig::artifacts_dir(root),
            PathBuf::from("/project/artifacts")
        );
        assert_eq!(StagingConfig::recognized_suffixes(), vec![".node", ".so"]);
    }

    #[test]
    fn test_weston_config_builder() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("weston.log");

        let config = WestonConfig::new(temp_dir.path())
            .with_binary("/usr/bin/weston")
            .with_runtime_dir(temp_dir.path())
            .with_log_file(&log_file)
            .with_ready_poll_interval(Duration::from_millis(20));

        assert_eq!(config.binary_path, PathBuf::from("/usr/bin/weston"));
        assert_eq!(config.runtime_dir.as_deref(), Some(temp_dir.path()));
        assert_eq!(config.log_file, Some(log_file));
        assert_eq!(config.ready_poll_interval, Duration::from_millis(20));
        assert_eq!(config.data_dir(), temp_dir.path().join("weston"));
    }
}
