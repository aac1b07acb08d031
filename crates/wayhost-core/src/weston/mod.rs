//! Weston compositor backend.
//!
//! [`WestonCompositor`] implements the native boundary by running the
//! compositor binary against the staged artifacts directory. Its `initialize`
//! step maps the staged modules for the compositor (`WESTON_MODULE_MAP`,
//! `WESTON_DATA_DIR`).

mod compositor;
mod module_map;

pub use compositor::WestonCompositor;
pub use module_map::ModuleEnvironment;
