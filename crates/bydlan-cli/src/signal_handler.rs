//! Shutdown on SIGINT / SIGTERM

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancel `token` on the first SIGINT or SIGTERM.
///
/// A second signal aborts the process without waiting for in-flight
/// handlers.
pub fn spawn(token: CancellationToken) -> std::io::Result<JoinHandle<()>> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let handle = signals.handle();

    Ok(tokio::spawn(async move {
        while let Some(signal) = signals.next().await {
            if token.is_cancelled() {
                tracing::warn!(signal, "second signal received, exiting immediately");
                std::process::exit(130);
            }
            tracing::info!(signal, "shutdown requested, finishing in-flight messages");
            token.cancel();
        }
        handle.close();
    }))
}
