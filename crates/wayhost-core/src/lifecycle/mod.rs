//! Native compositor lifecycle.
//!
//! The native module is modelled as a [`NativeCompositor`] capability with an
//! `initialize` step and an async `run`. [`WaylandRuntime`] owns the module and
//! its initialize-once gate and turns a run into a [`Launch`]: a one-shot
//! readiness event plus a future of the exit code.
//!
//! # Example
//!
//! ```rust,no_run
//! use wayhost::lifecycle::WaylandRuntime;
//! use wayhost::weston::WestonCompositor;
//! use wayhost::WestonConfig;
//!
//! #[tokio::main]
//! async fn main() -> wayhost::Result<()> {
//!     let runtime = WaylandRuntime::start(WestonCompositor::new(WestonConfig::new("artifacts")))?;
//!
//!     let mut launch = runtime.launch();
//!     if launch.ready().wait().await {
//!         println!("compositor accepts clients");
//!     }
//!     let code = launch.wait().await?;
//!     println!("exit: {code}");
//!     Ok(())
//! }
//! ```

mod native;
mod runtime;
mod state;

pub use native::{ready_channel, LaunchRequest, NativeCompositor, ReadyNotifier, ReadySignal};
pub use runtime::{Launch, WaylandRuntime};
pub use state::{Lifecycle, LifecycleState};
