//! Initialize-once gate for the native module.

use std::sync::atomic::{AtomicU8, Ordering};

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const INITIALIZED: u8 = 2;

/// Observable lifecycle of the native module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
}

/// One-way `Uninitialized -> Initialized` gate.
///
/// Misuse (a second initialization, or a launch through an uninitialized gate)
/// is a defect in the caller and panics.
#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNINITIALIZED),
        }
    }

    pub fn state(&self) -> LifecycleState {
        match self.state.load(Ordering::Acquire) {
            INITIALIZED => LifecycleState::Initialized,
            _ => LifecycleState::Uninitialized,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state() == LifecycleState::Initialized
    }

    /// Run `setup` and mark the gate initialized if it succeeds.
    ///
    /// A failed setup leaves the gate uninitialized so the caller may retry.
    ///
    /// # Panics
    ///
    /// If the gate is already initialized or another setup is in progress.
    pub fn initialize<T, E>(&self, setup: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        if self
            .state
            .compare_exchange(
                UNINITIALIZED,
                INITIALIZING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            panic!("BUG: native module initialized more than once");
        }

        let reset = ResetOnDrop { state: &self.state };
        let result = setup();
        std::mem::forget(reset);

        match result {
            Ok(value) => {
                self.state.store(INITIALIZED, Ordering::Release);
                Ok(value)
            }
            Err(err) => {
                self.state.store(UNINITIALIZED, Ordering::Release);
                Err(err)
            }
        }
    }

    /// # Panics
    ///
    /// If the gate has not been initialized.
    pub fn assert_initialized(&self) {
        if !self.is_initialized() {
            panic!("BUG: launch requested before the native module was initialized");
        }
    }
}

/// Returns the gate to `Uninitialized` if setup unwinds.
struct ResetOnDrop<'a> {
    state: &'a AtomicU8,
}

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.state.store(UNINITIALIZED, Ordering::Release);
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_transitions_once() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);

        let value: Result<u8, ()> = lifecycle.initialize(|| Ok(7));
        assert_eq!(value, Ok(7));
        assert_eq!(lifecycle.state(), LifecycleState::Initialized);
        lifecycle.assert_initialized();
    }

    #[test]
    fn test_failed_setup_stays_uninitialized() {
        let lifecycle = Lifecycle::new();
        let result: Result<(), &str> = lifecycle.initialize(|| Err("no addon path"));

        assert_eq!(result, Err("no addon path"));
        assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);

        let retried: Result<(), &str> = lifecycle.initialize(|| Ok(()));
        assert!(retried.is_ok());
        assert!(lifecycle.is_initialized());
    }

    #[test]
    fn test_panicking_setup_can_be_retried() {
        let lifecycle = Lifecycle::new();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: Result<(), ()> = lifecycle.initialize(|| panic!("addon load crashed"));
        }));

        assert!(outcome.is_err());
        assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);

        let retried: Result<(), ()> = lifecycle.initialize(|| Ok(()));
        assert!(retried.is_ok());
        assert!(lifecycle.is_initialized());
    }

    #[test]
    #[should_panic(expected = "initialized more than once")]
    fn test_double_initialize_panics() {
        let lifecycle = Lifecycle::new();
        let _: Result<(), ()> = lifecycle.initialize(|| Ok(()));
        let _: Result<(), ()> = lifecycle.initialize(|| Ok(()));
    }

    #[test]
    #[should_panic(expected = "before the native module was initialized")]
    fn test_assert_uninitialized_panics() {
        Lifecycle::new().assert_initialized();
    }
}
