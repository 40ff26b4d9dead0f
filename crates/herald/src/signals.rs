//! Shutdown signals for the client session.
//!
//! Handlers are installed when [`ShutdownSignal::install`] returns, so a
//! signal delivered before the first `recv` is still observed.

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Signal listeners installed for the lifetime of a session.
pub struct ShutdownSignal {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
}

impl ShutdownSignal {
    /// Installs listeners for SIGINT and SIGTERM (Ctrl+C on Windows).
    ///
    /// # Returns
    ///
    /// An error if the platform refuses to register a listener.
    pub fn install() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            Ok(Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Waits for the next shutdown signal and returns its name.
    pub async fn recv(&mut self) -> &'static str {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.interrupt.recv() => "SIGINT",
                _ = self.terminate.recv() => "SIGTERM",
            }
        }

        #[cfg(not(unix))]
        {
            match tokio::signal::ctrl_c().await {
                Ok(()) => "Ctrl+C",
                Err(_) => std::future::pending().await,
            }
        }
    }
}
