//! Flattened copy of recognized artifacts into the distribution directory.

use super::types::{serialize_lossy, CollectionResult};
use crate::error::{HostError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One artifact copied into the distribution directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedArtifact {
    #[serde(serialize_with = "serialize_lossy")]
    pub source: PathBuf,
    #[serde(serialize_with = "serialize_lossy")]
    pub destination: PathBuf,
    pub bytes: u64,
}

/// Two sources that flattened onto the same staged name. The later one wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    #[serde(serialize_with = "serialize_lossy")]
    pub file_name: OsString,
    #[serde(serialize_with = "serialize_lossy")]
    pub overwritten: PathBuf,
    #[serde(serialize_with = "serialize_lossy")]
    pub winner: PathBuf,
}

/// Outcome of a successful staging run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageReport {
    #[serde(serialize_with = "serialize_lossy")]
    pub destination: PathBuf,
    pub staged: Vec<StagedArtifact>,
    pub collisions: Vec<Collision>,
}

impl StageReport {
    /// Distinct files present in the destination after the run.
    pub fn unique_files(&self) -> usize {
        self.staged.len() - self.collisions.len()
    }

    /// Pretty-printed JSON summary.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Copy every recognized artifact of `collection` to `destination/<basename>`.
///
/// Fails before writing anything when the collection is empty or holds no
/// recognized artifact. A failed copy stops the run; earlier copies stay.
pub fn stage(collection: &CollectionResult, destination: impl AsRef<Path>) -> Result<StageReport> {
    let destination = destination.as_ref();

    if collection.is_empty() {
        return Err(HostError::EmptySourceTree {
            root: collection.root.clone(),
        });
    }

    let selected: Vec<_> = collection.dynamic_libraries().collect();
    if selected.is_empty() {
        return Err(HostError::NoArtifacts {
            root: collection.root.clone(),
            suffixes: collection.suffixes.suffixes().to_vec(),
        });
    }

    info!("Found {} artifacts to copy.", selected.len());

    fs::create_dir_all(destination).map_err(|e| HostError::io_with_path(e, destination))?;

    let mut report = StageReport {
        destination: destination.to_path_buf(),
        ..Default::default()
    };
    let mut seen: HashMap<&OsStr, &Path> = HashMap::new();

    for artifact in selected {
        let dest_path = destination.join(&artifact.file_name);

        if let Some(previous) = seen.insert(&artifact.file_name, &artifact.source) {
            warn!(
                "{} from {} overwrites the copy staged from {}",
                artifact.display_name(),
                artifact.source.display(),
                previous.display()
            );
            report.collisions.push(Collision {
                file_name: artifact.file_name.clone(),
                overwritten: previous.to_path_buf(),
                winner: artifact.source.clone(),
            });
        }

        let bytes = fs::copy(&artifact.source, &dest_path).map_err(|e| HostError::CopyFailed {
            src: artifact.source.clone(),
            dest: dest_path.clone(),
            source: e,
        })?;

        debug!("{} -> {} ({} bytes)", artifact.source.display(), dest_path.display(), bytes);
        info!("  -> Copied {}", artifact.display_name());

        report.staged.push(StagedArtifact {
            source: artifact.source.clone(),
            destination: dest_path,
            bytes,
        });
    }

    info!("All artifacts copied successfully.");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{collect, SuffixSet};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_stages_only_recognized_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let install = temp_dir.path().join("install");
        let dest = temp_dir.path().join("artifacts");
        write(&install, "sub/a.node", b"addon");
        write(&install, "sub/b.txt", b"notes");
        write(&install, "c.so", b"\x7fELF shared");

        let collection = collect(&install, &SuffixSet::default()).unwrap();
        let report = stage(&collection, &dest).unwrap();

        assert_eq!(report.staged.len(), 2);
        assert!(report.collisions.is_empty());
        assert!(report.to_json().unwrap().contains("\"collisions\": []"));
        assert_eq!(fs::read(dest.join("a.node")).unwrap(), b"addon");
        assert_eq!(fs::read(dest.join("c.so")).unwrap(), b"\x7fELF shared");
        assert!(!dest.join("b.txt").exists());
    }

    #[test]
    fn test_empty_tree_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let install = temp_dir.path().join("install");
        fs::create_dir_all(&install).unwrap();
        let dest = temp_dir.path().join("artifacts");

        let collection = collect(&install, &SuffixSet::default()).unwrap();
        let err = stage(&collection, &dest).unwrap_err();

        assert!(matches!(err, HostError::EmptySourceTree { ref root } if root == &install));
        assert!(err.to_string().contains(&install.display().to_string()));
        assert!(!dest.exists());
    }

    #[test]
    fn test_no_recognized_artifacts_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let install = temp_dir.path().join("install");
        write(&install, "README.md", b"readme");
        write(&install, "doc/notes.txt", b"notes");
        let dest = temp_dir.path().join("artifacts");

        let collection = collect(&install, &SuffixSet::default()).unwrap();
        let err = stage(&collection, &dest).unwrap_err();

        assert!(matches!(err, HostError::NoArtifacts { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_basename_collision_last_write_wins() {
        let temp_dir = TempDir::new().unwrap();
        let install = temp_dir.path().join("install");
        write(&install, "a/libshell.so", b"first");
        write(&install, "b/libshell.so", b"second");
        let dest = temp_dir.path().join("artifacts");

        let collection = collect(&install, &SuffixSet::default()).unwrap();
        let report = stage(&collection, &dest).unwrap();

        // Traversal visits a/ before b/.
        assert_eq!(fs::read(dest.join("libshell.so")).unwrap(), b"second");
        assert_eq!(report.collisions.len(), 1);
        assert_eq!(report.collisions[0].winner, install.join("b/libshell.so"));
        assert_eq!(report.unique_files(), 1);
    }

    #[test]
    fn test_overwrites_existing_destination_file() {
        let temp_dir = TempDir::new().unwrap();
        let install = temp_dir.path().join("install");
        write(&install, "lib/weston.so", b"fresh build");
        let dest = temp_dir.path().join("artifacts");
        write(&dest, "weston.so", b"stale");

        let collection = collect(&install, &SuffixSet::default()).unwrap();
        stage(&collection, &dest).unwrap();

        assert_eq!(fs::read(dest.join("weston.so")).unwrap(), b"fresh build");
    }

    #[test]
    fn test_copy_failure_reports_paths() {
        let temp_dir = TempDir::new().unwrap();
        let install = temp_dir.path().join("install");
        write(&install, "lib/a.so", b"a");
        let dest = temp_dir.path().join("artifacts");
        // A directory in the way of the destination file.
        fs::create_dir_all(dest.join("a.so")).unwrap();

        let collection = collect(&install, &SuffixSet::default()).unwrap();
        let err = stage(&collection, &dest).unwrap_err();

        match err {
            HostError::CopyFailed { src, dest: to, .. } => {
                assert_eq!(src, install.join("lib/a.so"));
                assert_eq!(to, dest.join("a.so"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_staged_verbatim() {
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let install = temp_dir.path().join("install");
        let dest = temp_dir.path().join("artifacts");
        let names = [
            OsStr::from_bytes(b"lib\xffweston.so"),
            OsStr::from_bytes(b"a\xfe.so"),
            OsStr::from_bytes(b"a\xff.so"),
        ];
        fs::create_dir_all(install.join("lib")).unwrap();
        for (i, name) in names.iter().enumerate() {
            fs::write(install.join("lib").join(name), [i as u8]).unwrap();
        }

        let collection = collect(&install, &SuffixSet::default()).unwrap();
        let report = stage(&collection, &dest).unwrap();

        // a\xfe.so and a\xff.so share a lossy name but are distinct files.
        assert!(report.collisions.is_empty());
        assert_eq!(report.unique_files(), 3);
        for (i, name) in names.iter().enumerate() {
            assert_eq!(fs::read(dest.join(name)).unwrap(), [i as u8]);
        }
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 3);
        assert!(report.to_json().unwrap().contains("\u{fffd}"));
    }
}
