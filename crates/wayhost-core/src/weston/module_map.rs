//! Environment that points the compositor at the staged modules.

use crate::config::CompositorConfig;
use crate::error::{HostError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Variables exported to the compositor process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEnvironment {
    /// `name=path;name=path` for every loadable module, if any.
    pub module_map: Option<String>,
    /// Compositor data directory inside the artifacts directory.
    pub data_dir: PathBuf,
}

impl ModuleEnvironment {
    /// Scan the top level of `artifacts_dir` for loadable modules.
    ///
    /// Regular files (symlinks followed) whose name contains `.so` are mapped,
    /// in file name order.
    pub fn scan(artifacts_dir: &Path) -> Result<Self> {
        let entries =
            std::fs::read_dir(artifacts_dir).map_err(|e| HostError::io_with_path(e, artifacts_dir))?;

        let mut modules: Vec<(String, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| HostError::io_with_path(e, artifacts_dir))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if !name.contains(CompositorConfig::MODULE_MARKER) {
                continue;
            }
            if !std::fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false) {
                continue;
            }
            modules.push((name, path));
        }
        modules.sort();

        debug!(
            "Found {} compositor modules in {}",
            modules.len(),
            artifacts_dir.display()
        );

        let module_map = if modules.is_empty() {
            None
        } else {
            Some(
                modules
                    .iter()
                    .map(|(name, path)| format!("{}={}", name, path.display()))
                    .collect::<Vec<_>>()
                    .join(";"),
            )
        };

        Ok(Self {
            module_map,
            data_dir: artifacts_dir.join(CompositorConfig::DATA_DIR_NAME),
        })
    }

    /// Environment variables to set on the compositor process.
    pub fn vars(&self) -> Vec<(&'static str, OsString)> {
        let mut vars = Vec::with_capacity(2);
        if let Some(ref map) = self.module_map {
            vars.push((CompositorConfig::MODULE_MAP_ENV, OsString::from(map)));
        }
        vars.push((
            CompositorConfig::DATA_DIR_ENV,
            self.data_dir.clone().into_os_string(),
        ));
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_builds_module_map() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in ["kiosk-shell.so", "libweston-14.so.0", "nodejs_wayland.node", "notes.txt"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }
        // Directories never count as modules.
        std::fs::create_dir(dir.join("dir.so")).unwrap();

        let env = ModuleEnvironment::scan(dir).unwrap();

        let expected = format!(
            "kiosk-shell.so={};libweston-14.so.0={}",
            dir.join("kiosk-shell.so").display(),
            dir.join("libweston-14.so.0").display()
        );
        assert_eq!(env.module_map.as_deref(), Some(expected.as_str()));
        assert_eq!(env.data_dir, dir.join("weston"));
    }

    #[test]
    fn test_scan_without_modules_sets_only_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("addon.node"), b"").unwrap();

        let env = ModuleEnvironment::scan(temp_dir.path()).unwrap();
        assert!(env.module_map.is_none());

        let vars = env.vars();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].0, "WESTON_DATA_DIR");
    }

    #[test]
    fn test_scan_missing_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = ModuleEnvironment::scan(&temp_dir.path().join("artifacts")).unwrap_err();
        assert!(matches!(err, HostError::Io { path: Some(_), .. }));
    }
}
