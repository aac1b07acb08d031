//! Launch bridge: explicit runtime handle over a [`NativeCompositor`].

use super::native::{ready_channel, LaunchRequest, NativeCompositor, ReadySignal};
use super::state::{Lifecycle, LifecycleState};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// An in-flight compositor run.
///
/// Readiness and termination are separate: [`Launch::ready`] is a one-shot
/// event, [`Launch::wait`] the exit code. The run keeps going if the handle is
/// dropped.
#[derive(Debug)]
pub struct Launch<E> {
    ready: ReadySignal,
    outcome: JoinHandle<Result<i32, E>>,
}

impl<E> Launch<E> {
    /// Readiness event of this run.
    pub fn ready(&mut self) -> &mut ReadySignal {
        &mut self.ready
    }

    /// Wait for the compositor to terminate.
    ///
    /// Resolves with the exit code, or the native error exactly as the native
    /// layer produced it. A panic inside the native layer is resumed here.
    pub async fn wait(self) -> Result<i32, E> {
        join_outcome(self.outcome).await
    }
}

async fn join_outcome<E>(outcome: JoinHandle<Result<i32, E>>) -> Result<i32, E> {
    match outcome.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => panic!("BUG: compositor task cancelled: {err}"),
    }
}

/// Runtime handle owning the native module and its lifecycle gate.
///
/// Concurrent launches through one handle are not supported: the compositor is
/// a single process, and native implementations may reject a second run.
pub struct WaylandRuntime<N: NativeCompositor> {
    native: Arc<N>,
    lifecycle: Lifecycle,
}

impl<N: NativeCompositor> WaylandRuntime<N> {
    /// Wrap `native` without initializing it.
    pub fn new(native: N) -> Self {
        Self {
            native: Arc::new(native),
            lifecycle: Lifecycle::new(),
        }
    }

    /// Wrap and initialize `native` in one step.
    pub fn start(native: N) -> Result<Self, N::Error> {
        let runtime = Self::new(native);
        runtime.initialize()?;
        Ok(runtime)
    }

    /// Initialize the native module.
    ///
    /// # Panics
    ///
    /// If the module was already initialized through this handle.
    pub fn initialize(&self) -> Result<(), N::Error> {
        debug!("Initializing native compositor module");
        self.lifecycle.initialize(|| self.native.initialize())?;
        info!("Native compositor module initialized");
        Ok(())
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn native(&self) -> &Arc<N> {
        &self.native
    }

    /// Start the compositor with the fixed kiosk arguments.
    ///
    /// Must be called within a Tokio runtime.
    ///
    /// # Panics
    ///
    /// If the module has not been initialized.
    pub fn launch(&self) -> Launch<N::Error> {
        let (notifier, ready) = ready_channel();
        self.spawn(LaunchRequest::kiosk(Some(notifier)), ready)
    }

    /// Callback-style launch.
    ///
    /// `on_ready` runs at most once, and always before this future resolves.
    ///
    /// # Panics
    ///
    /// If the module has not been initialized.
    pub async fn launch_with_callback<F>(&self, on_ready: Option<F>) -> Result<i32, N::Error>
    where
        F: FnOnce() + Send,
    {
        let Some(callback) = on_ready else {
            let launch = self.spawn(LaunchRequest::kiosk(None), ReadySignal::disabled());
            return launch.wait().await;
        };

        let Launch { mut ready, outcome } = self.launch();
        let mut callback = Some(callback);
        let outcome = join_outcome(outcome);
        tokio::pin!(outcome);

        let result = loop {
            tokio::select! {
                biased;
                fired = ready.wait(), if !ready.is_settled() => {
                    if fired {
                        if let Some(callback) = callback.take() {
                            callback();
                        }
                    }
                }
                result = &mut outcome => break result,
            }
        };

        // A notification sent just before termination is still delivered first.
        if ready.has_fired() {
            if let Some(callback) = callback.take() {
                callback();
            }
        }

        result
    }

    fn spawn(&self, request: LaunchRequest, ready: ReadySignal) -> Launch<N::Error> {
        self.lifecycle.assert_initialized();

        info!("Launching compositor: {}", request.args().join(" "));
        if !request.has_notifier() {
            debug!("No readiness observer attached");
        }

        let native = Arc::clone(&self.native);
        let outcome = tokio::spawn(async move {
            let result = native.run(request).await;
            match &result {
                Ok(code) => info!("Compositor exited with code {}", code),
                Err(e) => warn!("Compositor run failed: {}", e),
            }
            result
        });

        Launch { ready, outcome }
    }
}
