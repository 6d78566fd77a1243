// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns SIGINT/SIGTERM into a cancelled [`CancellationToken`].

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Which signal ended the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Interrupt,
    Terminate,
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stop::Interrupt => "SIGINT",
            Stop::Terminate => "SIGTERM",
        })
    }
}

/// Spawns a watcher and returns the token it cancels on the first signal.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        let stop = next_stop().await;
        info!(signal = %stop, "shutting down");
        trigger.cancel();
    });
    token
}

async fn interrupt() -> Stop {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    Stop::Interrupt
}

#[cfg(unix)]
async fn next_stop() -> Stop {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => tokio::select! {
            stop = interrupt() => stop,
            _ = term.recv() => Stop::Terminate,
        },
        Err(e) => {
            warn!(error = %e, "cannot listen for SIGTERM; Ctrl+C only");
            interrupt().await
        }
    }
}

#[cfg(not(unix))]
async fn next_stop() -> Stop {
    interrupt().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_names_match_signal_names() {
        assert_eq!(Stop::Interrupt.to_string(), "SIGINT");
        assert_eq!(Stop::Terminate.to_string(), "SIGTERM");
    }

    #[tokio::test]
    async fn token_starts_live() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }
}
