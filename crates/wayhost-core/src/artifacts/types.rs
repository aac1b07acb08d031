//! Artifact data model.

use crate::config::StagingConfig;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Extension category of a discovered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    DynamicLibrary,
    Ignored,
}

/// A file discovered under the install tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Absolute source path.
    #[serde(serialize_with = "serialize_lossy")]
    pub source: PathBuf,
    /// Base name, used byte for byte as the staged file name.
    #[serde(serialize_with = "serialize_lossy")]
    pub file_name: OsString,
    pub kind: ArtifactKind,
}

impl Artifact {
    /// Base name for logs and reports.
    pub fn display_name(&self) -> Cow<'_, str> {
        self.file_name.to_string_lossy()
    }

    /// Whether this artifact is staged.
    pub fn is_dynamic_library(&self) -> bool {
        self.kind == ArtifactKind::DynamicLibrary
    }
}

/// Recognized artifact suffixes. Matching is a case-sensitive suffix test on
/// the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixSet {
    suffixes: Vec<String>,
}

impl SuffixSet {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Suffix test on the raw name, so non-UTF-8 names still match.
    pub fn matches(&self, file_name: impl AsRef<OsStr>) -> bool {
        let name = file_name.as_ref().as_encoded_bytes();
        self.suffixes.iter().any(|s| name.ends_with(s.as_bytes()))
    }

    /// Classify a discovered path.
    pub fn classify(&self, path: &Path) -> Artifact {
        let file_name = path.file_name().map(OsStr::to_os_string).unwrap_or_default();

        let kind = if self.matches(&file_name) {
            ArtifactKind::DynamicLibrary
        } else {
            ArtifactKind::Ignored
        };

        Artifact {
            source: path.to_path_buf(),
            file_name,
            kind,
        }
    }
}

impl Default for SuffixSet {
    fn default() -> Self {
        Self::new(StagingConfig::recognized_suffixes())
    }
}

/// Every file found under one root, in traversal order.
#[derive(Debug, Clone)]
pub struct CollectionResult {
    pub root: PathBuf,
    pub suffixes: SuffixSet,
    pub artifacts: Vec<Artifact>,
}

impl CollectionResult {
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Artifacts eligible for staging.
    pub fn dynamic_libraries(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(|a| a.is_dynamic_library())
    }
}

/// Serialize a path-like value as a string, replacing invalid UTF-8.
pub(crate) fn serialize_lossy<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<OsStr>,
    S: Serializer,
{
    serializer.serialize_str(&value.as_ref().to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_suffixes_match() {
        let suffixes = SuffixSet::default();
        assert!(suffixes.matches("nodejs_wayland.node"));
        assert!(suffixes.matches("libweston-14.so"));
        assert!(!suffixes.matches("libweston-14.so.0"));
        assert!(!suffixes.matches("README.md"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let suffixes = SuffixSet::default();
        assert!(!suffixes.matches("ADDON.NODE"));
        assert!(!suffixes.matches("libfoo.SO"));
    }

    #[test]
    fn test_classify() {
        let suffixes = SuffixSet::default();

        let addon = suffixes.classify(Path::new("/install/lib/addon.node"));
        assert_eq!(addon.file_name, "addon.node");
        assert_eq!(addon.kind, ArtifactKind::DynamicLibrary);

        let header = suffixes.classify(Path::new("/install/include/weston.h"));
        assert_eq!(header.kind, ArtifactKind::Ignored);
        assert!(!header.is_dynamic_library());
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_keeps_raw_file_name() {
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"lib\xffweston.so");
        let artifact = SuffixSet::default().classify(&Path::new("/install/lib").join(raw));

        assert_eq!(artifact.file_name, raw);
        assert_eq!(artifact.kind, ArtifactKind::DynamicLibrary);
        assert_eq!(artifact.display_name(), "lib\u{fffd}weston.so");
    }
}
