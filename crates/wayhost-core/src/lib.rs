//! wayhost - packaging and launch bridge for a kiosk Wayland compositor.
//!
//! Two halves:
//! - [`artifacts`] collects the compiled modules from the install tree and
//!   stages them into a flat distribution directory.
//! - [`lifecycle`] turns the compositor's single-shot native entry point into
//!   an async launch that reports readiness and the final exit code.
//!
//! # Example
//!
//! ```rust,no_run
//! use wayhost::{WaylandRuntime, WestonCompositor, WestonConfig};
//!
//! #[tokio::main]
//! async fn main() -> wayhost::Result<()> {
//!     wayhost::stage_install_tree("builddir/install", "artifacts")?;
//!
//!     let runtime = WaylandRuntime::start(WestonCompositor::new(WestonConfig::new("artifacts")))?;
//!     let code = runtime
//!         .launch_with_callback(Some(|| println!("compositor ready")))
//!         .await?;
//!     println!("exit: {code}");
//!     Ok(())
//! }
//! ```

pub mod artifacts;
pub mod config;
pub mod error;
pub mod lifecycle;
#[cfg(unix)]
pub mod platform;
#[cfg(unix)]
pub mod weston;

// Re-export commonly used types
pub use artifacts::{
    stage_install_tree, Artifact, ArtifactKind, CollectionResult, StageReport, SuffixSet,
};
pub use config::{CompositorConfig, StagingConfig, WestonConfig};
pub use error::{HostError, Result};
pub use lifecycle::{Launch, LaunchRequest, LifecycleState, NativeCompositor, WaylandRuntime};
#[cfg(unix)]
pub use weston::WestonCompositor;
