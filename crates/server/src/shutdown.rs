use anyhow::Result;
use tracing::{info, warn};

use crate::state::AppState;

/// Stop request from the operator (ctrl-c) or the supervisor (SIGTERM on
/// unix). Handlers are registered by `install`, so a signal sent before
/// `wait` is polled is not lost.
pub struct ShutdownSignal {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    pub fn install() -> Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            terminate: tokio::signal::unix::signal(
                tokio::signal::unix::SignalKind::terminate(),
            )?,
        })
    }

    /// Resolves with the name of the signal that arrived first.
    pub async fn wait(&mut self) -> Result<&'static str> {
        #[cfg(unix)]
        {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    Ok("SIGINT")
                }
                _ = self.terminate.recv() => Ok("SIGTERM"),
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await?;
            Ok("SIGINT")
        }
    }
}

/// Writes the ledger and inventory snapshot whatever the outcome of serving,
/// then reports the serving error first.
pub async fn flush_then(state: &AppState, served: Result<()>) -> Result<()> {
    let flushed = state.flush().await;
    match &flushed {
        Ok(()) => info!(event_name = "system.server.flushed", "state flushed to disk"),
        Err(error) => warn!(
            event_name = "system.server.flush_failed",
            error = %error,
            "final flush failed"
        ),
    }

    served?;
    flushed?;
    Ok(())
}
