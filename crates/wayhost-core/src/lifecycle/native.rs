//! Capability boundary to the native compositor entry point.

use crate::config::CompositorConfig;
use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// One-shot readiness notifier handed to the native entry point.
///
/// Consumed by [`ReadyNotifier::notify`], so it can fire at most once. Dropping
/// it without notifying tells the observer readiness will never come.
#[derive(Debug)]
pub struct ReadyNotifier {
    tx: oneshot::Sender<()>,
}

impl ReadyNotifier {
    /// Signal that the service accepts connections.
    pub fn notify(self) {
        // The observer may have dropped its side; nothing to report then.
        let _ = self.tx.send(());
    }
}

/// Observer side of a [`ReadyNotifier`].
#[derive(Debug)]
pub struct ReadySignal {
    rx: Option<oneshot::Receiver<()>>,
    fired: bool,
}

impl ReadySignal {
    /// A signal that never fires (the launch carried no notifier).
    pub fn disabled() -> Self {
        Self {
            rx: None,
            fired: false,
        }
    }

    /// Wait for the notification.
    ///
    /// Returns `false` once it is known the notifier will never fire.
    pub async fn wait(&mut self) -> bool {
        if let Some(rx) = self.rx.as_mut() {
            self.fired = rx.await.is_ok();
            self.rx = None;
        }
        self.fired
    }

    /// Non-blocking check whether the notification has arrived.
    pub fn has_fired(&mut self) -> bool {
        if let Some(rx) = self.rx.as_mut() {
            match rx.try_recv() {
                Ok(()) => {
                    self.fired = true;
                    self.rx = None;
                }
                Err(TryRecvError::Closed) => self.rx = None,
                Err(TryRecvError::Empty) => {}
            }
        }
        self.fired
    }

    /// Whether the outcome of the signal is settled.
    pub fn is_settled(&self) -> bool {
        self.rx.is_none()
    }
}

/// Create a connected notifier/signal pair.
pub fn ready_channel() -> (ReadyNotifier, ReadySignal) {
    let (tx, rx) = oneshot::channel();
    (
        ReadyNotifier { tx },
        ReadySignal {
            rx: Some(rx),
            fired: false,
        },
    )
}

/// Immutable request forwarded to the native entry point.
#[derive(Debug)]
pub struct LaunchRequest {
    args: Vec<String>,
    on_ready: Option<ReadyNotifier>,
}

impl LaunchRequest {
    /// The fixed kiosk launch: `weston --shell=kiosk --xwayland`.
    pub fn kiosk(on_ready: Option<ReadyNotifier>) -> Self {
        Self {
            args: CompositorConfig::launch_args(),
            on_ready,
        }
    }

    /// A request with an arbitrary argument list, argv[0] first.
    pub fn with_args(args: Vec<String>, on_ready: Option<ReadyNotifier>) -> Self {
        Self { args, on_ready }
    }

    /// Argument list, argv[0] included.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn has_notifier(&self) -> bool {
        self.on_ready.is_some()
    }

    pub fn into_parts(self) -> (Vec<String>, Option<ReadyNotifier>) {
        (self.args, self.on_ready)
    }
}

/// Native compositor entry points.
///
/// `initialize` is called exactly once before any `run`. `run` resolves with
/// the process exit code when the compositor terminates; failures carry the
/// implementation's own error value, which the launch bridge returns unchanged.
#[async_trait]
pub trait NativeCompositor: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// One-time module setup.
    fn initialize(&self) -> Result<(), Self::Error>;

    /// Run the compositor to termination.
    async fn run(&self, request: LaunchRequest) -> Result<i32, Self::Error>;
}
