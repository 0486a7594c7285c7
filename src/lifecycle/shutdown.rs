//! Signal handling for graceful shutdown

use std::fmt;
use std::io;

use tokio::signal::unix::{signal, SignalKind};
use tracing::debug;

/// Why the daemon is shutting down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Terminate,
    Interrupt,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Terminate => write!(f, "SIGTERM"),
            ShutdownReason::Interrupt => write!(f, "SIGINT"),
        }
    }
}

/// Handles shutdown signals (SIGTERM, SIGINT)
pub struct ShutdownSignal;

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self
    }

    /// Wait for a shutdown signal
    ///
    /// Fails only if the handlers cannot be registered.
    pub async fn wait(&self) -> io::Result<ShutdownReason> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        let reason = tokio::select! {
            _ = sigterm.recv() => ShutdownReason::Terminate,
            _ = sigint.recv() => ShutdownReason::Interrupt,
        };
        debug!(%reason, "received shutdown signal");
        Ok(reason)
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_display() {
        assert_eq!(ShutdownReason::Terminate.to_string(), "SIGTERM");
        assert_eq!(ShutdownReason::Interrupt.to_string(), "SIGINT");
    }
}
