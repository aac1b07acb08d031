//! Platform layer.
//!
//! The compositor only exists on Unix; everything OS-specific (signals, wait
//! statuses, socket probing) lives here.

pub mod process;
pub mod socket;

pub use process::{exit_code, request_termination};
pub use socket::{list_sockets, wait_for_new_socket};
