//! Error types for wayhost.
//!
//! Packaging failures are terminal for the staging run; compositor failures are
//! returned through the launch future unchanged.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the wayhost library.
#[derive(Debug, Error)]
pub enum HostError {
    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    // Staging errors
    #[error("Install directory '{}' is empty or does not exist", root.display())]
    EmptySourceTree { root: PathBuf },

    #[error("No {} files found in '{}'", suffixes.join(" or "), root.display())]
    NoArtifacts { root: PathBuf, suffixes: Vec<String> },

    #[error("Failed to copy {} to {}: {source}", src.display(), dest.display())]
    CopyFailed {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Compositor errors
    #[error("Compositor binary not found: {0}")]
    BinaryNotFound(PathBuf),

    #[error("An instance of the compositor is already running")]
    AlreadyRunning,

    #[error("Compositor launch failed for {program}: {message}")]
    LaunchFailed { program: String, message: String },

    #[error("Empty argument list: argv[0] must name the compositor")]
    EmptyArguments,

    #[error("Compositor is not running")]
    NotRunning,

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for wayhost operations.
pub type Result<T> = std::result::Result<T, HostError>;

impl From<std::io::Error> for HostError {
    fn from(err: std::io::Error) -> Self {
        HostError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for HostError {
    fn from(err: serde_json::Error) -> Self {
        HostError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl HostError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        HostError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Follow-up line shown to the user after the error itself.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            HostError::EmptySourceTree { .. } => {
                Some("Please ensure 'meson install' ran successfully.")
            }
            HostError::NoArtifacts { .. } => {
                Some("The build may have failed to produce the final libraries.")
            }
            HostError::BinaryNotFound(_) => {
                Some("Pass --weston-bin or make sure the compositor is on PATH.")
            }
            _ => None,
        }
    }

    /// Whether the failure happened before anything was written to disk.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            HostError::EmptySourceTree { .. }
                | HostError::NoArtifacts { .. }
                | HostError::NotADirectory(_)
        )
    }
}
