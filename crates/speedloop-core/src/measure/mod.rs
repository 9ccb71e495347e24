//! Streaming measurement engine.
//!
//! `measure` starts one HTTP GET on a dedicated thread and returns a
//! `SampleStream`. The producer hands samples over a rendezvous channel
//! (capacity 0), so it blocks until the consumer takes each one: a slow
//! consumer delays the next tick instead of letting samples pile up.
//!
//! TLS peer and host verification are always disabled (`INSECURE_TLS`). The
//! tool measures raw throughput against arbitrary mirrors and test endpoints,
//! including self-signed ones; it never sends credentials.

mod meter;
mod transfer;

use crate::cancel::CancelToken;
use crate::error::MeasureError;
use crate::sample::Sample;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Certificate and host-name verification are off for every request.
pub const INSECURE_TLS: bool = true;

/// Default receive buffer: libcurl hands the body over in reads of at most this size.
pub const DEFAULT_BUFFER_BYTES: usize = 32 * 1024;

/// Engine knobs. Defaults: 1 s ticks, 32 KiB reads, 30 s connect timeout, 10 redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub tick_interval: Duration,
    pub buffer_bytes: usize,
    pub connect_timeout: Duration,
    pub max_redirects: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            buffer_bytes: DEFAULT_BUFFER_BYTES,
            connect_timeout: Duration::from_secs(30),
            max_redirects: 10,
        }
    }
}

/// How a transfer ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Body fully read; the last sample carried these totals.
    Completed { bytes: u64 },
    /// A single error sample was emitted.
    Failed(MeasureError),
    /// Stopped by the cancel token or because the consumer went away. No final sample.
    Cancelled,
}

/// Lazy, finite sequence of samples for one URL.
///
/// Iterate until `None`, then call `finish` for the outcome. Dropping the
/// stream early marks it detached; the producer aborts at its next libcurl
/// callback in any phase (connect, headers or body) and the drop waits for that.
pub struct SampleStream {
    detached: CancelToken,
    rx: Option<mpsc::Receiver<Sample>>,
    handle: Option<JoinHandle<Outcome>>,
}

impl SampleStream {
    /// Disconnect (if still draining) and wait for the producer.
    pub fn finish(mut self) -> Outcome {
        self.join()
    }

    fn join(&mut self) -> Outcome {
        self.detached.cancel();
        drop(self.rx.take());
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                tracing::error!("measurement thread panicked");
                Outcome::Cancelled
            }),
            None => Outcome::Cancelled,
        }
    }
}

impl Iterator for SampleStream {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        self.rx.as_ref()?.recv().ok()
    }
}

impl Drop for SampleStream {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.join();
        }
    }
}

/// Starts measuring `url` on a new thread. Pass a never-cancelled token when
/// cancellation is not needed.
pub fn measure(url: &str, opts: &EngineOptions, cancel: &CancelToken) -> SampleStream {
    let (tx, rx) = mpsc::sync_channel::<Sample>(0);
    let url = url.to_string();
    let opts = opts.clone();
    let cancel = cancel.clone();
    let detached = CancelToken::new();
    let handle = thread::spawn({
        let detached = detached.clone();
        move || transfer::run_transfer(&url, &opts, &cancel, &detached, &tx)
    });
    SampleStream {
        detached,
        rx: Some(rx),
        handle: Some(handle),
    }
}
