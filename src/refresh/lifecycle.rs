//! Lifecycle-scoped shutdown signalling.
//!
//! The refresh loop is tied to a [`Shutdown`] handle instead of running as a
//! free-floating interval: request once, every subscriber wakes, in-flight
//! work gets cancelled at teardown.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe; the receiver observes `true` once shutdown is requested
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn is_requested(&self) -> bool {
        *self.tx.borrow()
    }

    /// Request shutdown; duplicate requests are ignored
    pub fn request(&self) {
        if self.tx.send_replace(true) {
            return;
        }
        info!("shutdown requested");
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire SIGINT/SIGTERM to the shutdown handle
pub fn install_signal_handlers(shutdown: Arc<Shutdown>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        shutdown.request();
    });
}
