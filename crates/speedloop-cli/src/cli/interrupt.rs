//! Ctrl-C handling: first interrupt cancels the shared token, second one exits.

use speedloop_core::cancel::CancelToken;
use std::future::Future;
use std::io;

/// Exit status used when a second interrupt forces the process down (128 + SIGINT).
const FORCED_EXIT_CODE: i32 = 130;

/// Waits for `signal` and cancels `cancel` as soon as it fires. Returns false
/// if the signal could not be listened for.
///
/// Cancels before anything is printed: the report loop may be holding stdout.
pub async fn cancel_on<S>(signal: S, cancel: &CancelToken) -> bool
where
    S: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::warn!("cannot listen for Ctrl-C: {}", e);
        return false;
    }
    cancel.cancel();
    tracing::info!("interrupt received; cancelling downloads");
    true
}

/// Spawns a task that cancels `cancel` on the first Ctrl-C. The download loop
/// notices at its next callback; a second Ctrl-C exits immediately.
pub fn spawn_interrupt_handler(cancel: CancelToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !cancel_on(tokio::signal::ctrl_c(), &cancel).await {
            return;
        }
        println!("\nReceived interrupt signal. Shutting down...");

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("second interrupt; exiting without waiting");
            std::process::exit(FORCED_EXIT_CODE);
        }
    })
}
