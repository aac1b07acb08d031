//! Recursive discovery of files under the install tree.

use super::types::{CollectionResult, SuffixSet};
use crate::error::{HostError, Result};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Find every non-directory entry reachable from `root`.
///
/// Symlinks are followed. A missing root, or an entry that vanishes or dangles
/// during the walk, contributes nothing; any other filesystem error aborts the
/// traversal.
pub fn find_files(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = std::path::absolute(root.as_ref())
        .map_err(|e| HostError::io_with_path(e, root.as_ref()))?;

    match std::fs::metadata(&root) {
        Ok(meta) if !meta.is_dir() => return Err(HostError::NotADirectory(root)),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Root {} does not exist, nothing to collect", root.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(HostError::io_with_path(e, &root)),
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(&root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if is_not_found(&err) => {
                debug!(
                    "Skipping missing entry {}",
                    err.path().unwrap_or(&root).display()
                );
                continue;
            }
            Err(err) => return Err(walk_error(err, &root)),
        };

        if entry.file_type().is_dir() {
            continue;
        }

        files.push(entry.into_path());
    }

    Ok(files)
}

/// Find every file under `root` and classify it against `suffixes`.
pub fn collect(root: impl AsRef<Path>, suffixes: &SuffixSet) -> Result<CollectionResult> {
    let root = root.as_ref();
    let artifacts = find_files(root)?
        .iter()
        .map(|path| suffixes.classify(path))
        .collect::<Vec<_>>();

    debug!(
        "Collected {} files under {}",
        artifacts.len(),
        root.display()
    );

    Ok(CollectionResult {
        root: root.to_path_buf(),
        suffixes: suffixes.clone(),
        artifacts,
    })
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .map(|e| e.kind() == io::ErrorKind::NotFound)
        .unwrap_or(false)
}

fn walk_error(err: walkdir::Error, root: &Path) -> HostError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    let message = err.to_string();

    match err.into_io_error() {
        Some(source) => HostError::io_with_path(source, path),
        // Symlink loop
        None => HostError::Io {
            message,
            path: Some(path),
            source: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_finds_all_files_at_any_depth() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let expected: BTreeSet<PathBuf> = [
            "top.so",
            "lib/a.node",
            "lib/x86_64-linux-gnu/weston/desktop-shell.so",
            "share/weston/icon.png",
            "a/b/c/d/e/deep.txt",
        ]
        .iter()
        .map(|rel| touch(root, rel))
        .collect();
        fs::create_dir_all(root.join("empty/dir")).unwrap();

        let found = find_files(root).unwrap();

        assert_eq!(found.len(), expected.len(), "no duplicates");
        assert_eq!(found.into_iter().collect::<BTreeSet<_>>(), expected);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let found = find_files(temp_dir.path().join("builddir/install")).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_file_root_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let file = touch(temp_dir.path(), "plain.so");

        let err = find_files(&file).unwrap_err();
        assert!(matches!(err, HostError::NotADirectory(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let kept = touch(root, "libweston.so");
        std::os::unix::fs::symlink(root.join("gone.so"), root.join("dangling.so")).unwrap();

        let found = find_files(root).unwrap();
        assert_eq!(found, vec![kept]);
    }

    #[test]
    fn test_collect_classifies_entries() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "sub/a.node");
        touch(temp_dir.path(), "sub/b.txt");
        touch(temp_dir.path(), "c.so");

        let collection = collect(temp_dir.path(), &SuffixSet::default()).unwrap();
        let staged: BTreeSet<_> = collection
            .dynamic_libraries()
            .map(|a| a.display_name().into_owned())
            .collect();

        assert_eq!(collection.len(), 3);
        assert_eq!(
            staged,
            BTreeSet::from(["a.node".to_string(), "c.so".to_string()])
        );
    }
}
