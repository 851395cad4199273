use std::io;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Cancels `token` if nobody has yet. Returns `true` only for the call that
/// actually started the shutdown, so repeated signals are harmless.
pub fn request_shutdown(token: &CancellationToken) -> bool {
    if token.is_cancelled() {
        debug!("Shutdown already in progress, ignoring signal");
        return false;
    }

    info!("Shutting down...");
    token.cancel();
    true
}

/// Listens for Ctrl-C (and SIGTERM on unix) for the rest of the process
/// lifetime, turning each one into a [`request_shutdown`] call.
pub fn spawn_signal_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = wait_for_signal().await {
                warn!("Failed to listen for shutdown signals: {}", e);
                return;
            }
            request_shutdown(&token);
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::tracing::capture::with_captured_logs;

    #[test]
    fn second_request_is_a_no_op() {
        let token = CancellationToken::new();
        assert!(request_shutdown(&token));
        assert!(token.is_cancelled());
        assert!(!request_shutdown(&token));
        assert!(token.is_cancelled());
    }

    #[test]
    fn child_tokens_observe_shutdown() {
        let token = CancellationToken::new();
        let child = token.child_token();
        request_shutdown(&token);
        assert!(child.is_cancelled());
    }

    #[test]
    fn shutdown_notice_is_logged_once() {
        let (_, logs) = with_captured_logs(|| {
            let token = CancellationToken::new();
            for _ in 0..3 {
                request_shutdown(&token);
            }
        });
        assert_eq!(logs.count("Shutting down..."), 1);
    }
}
