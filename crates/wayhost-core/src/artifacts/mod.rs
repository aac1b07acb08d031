//! Build-artifact collection.
//!
//! Discovers compiled shared libraries under the install tree and stages them,
//! flattened, into the distribution directory the runtime loads from.
//!
//! # Example
//!
//! ```rust,no_run
//! use wayhost::artifacts::{collect, stage, SuffixSet};
//!
//! fn main() -> wayhost::Result<()> {
//!     let collection = collect("builddir/install", &SuffixSet::default())?;
//!     let report = stage(&collection, "artifacts")?;
//!     println!("Staged {} files", report.staged.len());
//!     Ok(())
//! }
//! ```

mod locator;
mod stager;
mod types;

pub use locator::{collect, find_files};
pub use stager::{stage, Collision, StageReport, StagedArtifact};
pub use types::{Artifact, ArtifactKind, CollectionResult, SuffixSet};

use crate::error::Result;
use std::path::Path;
use tracing::info;

/// Run the whole packaging step with the recognized default suffixes.
pub fn stage_install_tree(
    install_dir: impl AsRef<Path>,
    artifacts_dir: impl AsRef<Path>,
) -> Result<StageReport> {
    let install_dir = install_dir.as_ref();
    info!("Searching for artifacts in '{}'...", install_dir.display());

    let collection = collect(install_dir, &SuffixSet::default())?;
    stage(&collection, artifacts_dir)
}
