//! One blocking GET driven by libcurl, emitting samples from its callbacks.
//!
//! libcurl only calls back between reads, so a tick check inside the write or
//! progress callback never races a pending read. The progress callback fires
//! at least about once a second even on a stalled connection, which bounds
//! how long cancellation and ticks can lag.

use super::meter::Meter;
use super::{EngineOptions, Outcome, INSECURE_TLS};
use crate::cancel::CancelToken;
use crate::error::{classify_curl_error, MeasureError, Phase};
use crate::sample::Sample;
use std::cell::RefCell;
use std::sync::mpsc::SyncSender;
use std::time::Instant;

/// Why a callback asked libcurl to abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Cancelled,
    /// Consumer dropped the receiving end.
    Detached,
    BadStatus(u32),
}

struct TransferState {
    phase: Phase,
    status: Option<u32>,
    /// When the most recent 2xx header block ended.
    headers_done: Option<Instant>,
    meter: Option<Meter>,
    stop: Option<Stop>,
}

impl TransferState {
    fn new() -> Self {
        Self {
            phase: Phase::Connecting,
            status: None,
            headers_done: None,
            meter: None,
            stop: None,
        }
    }

    /// Handles one header line. Returns false to abort the transfer.
    ///
    /// A 2xx block may be a proxy's CONNECT reply, with the origin's TLS
    /// handshake and headers still to come, so a header block alone never
    /// starts streaming; it only records when it ended.
    fn on_header(&mut self, line: &[u8], now: Instant) -> bool {
        if let Some(code) = parse_status_line(line) {
            self.status = Some(code);
            return true;
        }
        if line != b"\r\n" && line != b"\n" {
            return true;
        }
        let status = self.status;
        match status {
            Some(code) if (100..200).contains(&code) || (300..400).contains(&code) => true,
            Some(code) if !is_success(code) => {
                self.stop = Some(Stop::BadStatus(code));
                false
            }
            _ => {
                self.headers_done = Some(now);
                true
            }
        }
    }

    /// Records body bytes. The first call switches to streaming; the meter is
    /// timed from the end of the last header block.
    fn on_body(&mut self, n: usize, now: Instant, opts: &EngineOptions) -> &mut Meter {
        self.phase = Phase::Streaming;
        let meter = self.meter_mut(now, opts);
        meter.record(n);
        meter
    }

    fn meter_mut(&mut self, now: Instant, opts: &EngineOptions) -> &mut Meter {
        let start = self.headers_done.unwrap_or(now);
        self.meter
            .get_or_insert_with(|| Meter::start(start, opts.tick_interval))
    }
}

fn configure(easy: &mut curl::easy::Easy, url: &str, opts: &EngineOptions) -> Result<(), curl::Error> {
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirects)?;
    easy.ssl_verify_peer(!INSECURE_TLS)?;
    easy.ssl_verify_host(!INSECURE_TLS)?;
    easy.buffer_size(opts.buffer_bytes)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.useragent(concat!("speedloop/", env!("CARGO_PKG_VERSION")))?;
    easy.progress(true)?;
    Ok(())
}

/// Parses the status code out of an `HTTP/x y reason` line.
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

fn fail(url: &str, tx: &SyncSender<Sample>, err: MeasureError) -> Outcome {
    tracing::warn!(url, "transfer failed: {}", err);
    let _ = tx.send(Sample::failed(url, err.clone()));
    Outcome::Failed(err)
}

fn register_callbacks<'data>(
    transfer: &mut curl::easy::Transfer<'_, 'data>,
    url: &'data str,
    opts: &'data EngineOptions,
    cancel: &'data CancelToken,
    detached: &'data CancelToken,
    tx: &'data SyncSender<Sample>,
    state: &'data RefCell<TransferState>,
) -> Result<(), curl::Error> {
    transfer.header_function(move |line| state.borrow_mut().on_header(line, Instant::now()))?;

    transfer.write_function(move |data| {
        if cancel.is_cancelled() {
            state.borrow_mut().stop = Some(Stop::Cancelled);
            return Ok(0);
        }
        if detached.is_cancelled() {
            state.borrow_mut().stop = Some(Stop::Detached);
            return Ok(0);
        }
        let now = Instant::now();
        let tick = {
            let mut st = state.borrow_mut();
            let meter = st.on_body(data.len(), now, opts);
            meter.tick_due(now).then(|| meter.sample(url, now))
        };
        if let Some(sample) = tick {
            if tx.send(sample).is_err() {
                state.borrow_mut().stop = Some(Stop::Detached);
                return Ok(0);
            }
        }
        Ok(data.len())
    })?;

    // Runs in every phase, including connect and while waiting for headers.
    transfer.progress_function(move |_, _, _, _| {
        if cancel.is_cancelled() {
            state.borrow_mut().stop = Some(Stop::Cancelled);
            return false;
        }
        if detached.is_cancelled() {
            state.borrow_mut().stop = Some(Stop::Detached);
            return false;
        }
        let now = Instant::now();
        let tick = match state.borrow_mut().meter.as_mut() {
            Some(meter) => meter.tick_due(now).then(|| meter.sample(url, now)),
            None => None,
        };
        if let Some(sample) = tick {
            if tx.send(sample).is_err() {
                state.borrow_mut().stop = Some(Stop::Detached);
                return false;
            }
        }
        true
    })?;

    Ok(())
}

/// Runs the transfer to completion, failure or cancellation. Emits tick samples
/// and exactly one final sample (success or error) unless stopped early.
/// `detached` is set by the consumer when it stops listening.
pub(super) fn run_transfer(
    url: &str,
    opts: &EngineOptions,
    cancel: &CancelToken,
    detached: &CancelToken,
    tx: &SyncSender<Sample>,
) -> Outcome {
    if cancel.is_cancelled() {
        tracing::debug!(url, "cancelled before connecting");
        return Outcome::Cancelled;
    }

    let state = RefCell::new(TransferState::new());
    let mut easy = curl::easy::Easy::new();
    if let Err(e) = configure(&mut easy, url, opts) {
        return fail(url, tx, MeasureError::Setup(e.to_string()));
    }
    tracing::debug!(url, "connecting");

    let performed = {
        let mut transfer = easy.transfer();
        match register_callbacks(&mut transfer, url, opts, cancel, detached, tx, &state) {
            Ok(()) => transfer.perform().map_err(|e| (e, false)),
            Err(e) => Err((e, true)),
        }
    };

    let mut st = state.into_inner();
    let now = Instant::now();
    match (st.stop, performed) {
        (Some(Stop::Cancelled), _) => {
            let elapsed = st.meter.as_ref().map(|m| m.elapsed(now)).unwrap_or_default();
            tracing::info!(url, "download took {:?} (cancelled)", elapsed);
            Outcome::Cancelled
        }
        (Some(Stop::Detached), _) => {
            tracing::debug!(url, "sample consumer went away; transfer aborted");
            Outcome::Cancelled
        }
        (Some(Stop::BadStatus(code)), _) => fail(url, tx, MeasureError::Http(code)),
        (None, Err((e, true))) => fail(url, tx, MeasureError::Setup(e.to_string())),
        (None, Err((e, false))) => fail(url, tx, classify_curl_error(&e, st.phase)),
        (None, Ok(())) => {
            let code = match easy.response_code() {
                Ok(code) => code,
                Err(e) => return fail(url, tx, classify_curl_error(&e, st.phase)),
            };
            if !is_success(code) {
                return fail(url, tx, MeasureError::Http(code));
            }
            let meter = st.meter_mut(now, opts);
            let bytes = meter.bytes();
            let sample = meter.sample(url, now);
            tracing::debug!(url, bytes, elapsed = ?sample.elapsed, "transfer completed");
            // The consumer may already be gone; the outcome is the same either way.
            let _ = tx.send(sample);
            Outcome::Completed { bytes }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn status_line_parsing() {
        assert_eq!(parse_status_line(b"HTTP/1.1 200 OK\r\n"), Some(200));
        assert_eq!(parse_status_line(b"HTTP/2 404\r\n"), Some(404));
        assert_eq!(parse_status_line(b"Content-Length: 5\r\n"), None);
        assert_eq!(parse_status_line(b"\r\n"), None);
    }

    fn feed(st: &mut TransferState, lines: &[&[u8]], now: Instant) {
        for line in lines {
            assert!(st.on_header(line, now));
        }
    }

    #[test]
    fn proxy_connect_reply_does_not_start_streaming() {
        let opts = EngineOptions::default();
        let t0 = Instant::now();
        let mut st = TransferState::new();

        feed(&mut st, &[b"HTTP/1.1 200 Connection established\r\n", b"\r\n"], t0);
        assert_eq!(st.phase, Phase::Connecting);
        assert!(st.meter.is_none());

        let origin_headers = t0 + Duration::from_millis(800);
        feed(
            &mut st,
            &[b"HTTP/1.1 200 OK\r\n", b"Content-Length: 10\r\n", b"\r\n"],
            origin_headers,
        );
        assert_eq!(st.phase, Phase::Connecting);

        let first_byte = origin_headers + Duration::from_millis(50);
        let meter = st.on_body(10, first_byte, &opts);
        assert_eq!(meter.bytes(), 10);
        assert_eq!(meter.elapsed(first_byte), Duration::from_millis(50));
        assert_eq!(st.phase, Phase::Streaming);
    }

    #[test]
    fn error_status_aborts_at_end_of_headers() {
        let mut st = TransferState::new();
        let now = Instant::now();
        assert!(st.on_header(b"HTTP/1.1 404 Not Found\r\n", now));
        assert!(!st.on_header(b"\r\n", now));
        assert_eq!(st.stop, Some(Stop::BadStatus(404)));
    }

    #[test]
    fn redirect_block_is_skipped() {
        let mut st = TransferState::new();
        let now = Instant::now();
        feed(&mut st, &[b"HTTP/1.1 302 Found\r\n", b"Location: /x\r\n", b"\r\n"], now);
        assert!(st.headers_done.is_none());
        assert!(st.stop.is_none());
    }

    #[test]
    fn success_range() {
        assert!(is_success(200));
        assert!(is_success(206));
        assert!(!is_success(301));
        assert!(!is_success(404));
    }
}
