//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a single static body to every GET, optionally in paced chunks so
//! tests can observe periodic samples and cancellation mid-transfer.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct BodyServerOptions {
    /// Status code sent with the body.
    pub status: u16,
    /// Bytes written per chunk.
    pub chunk_bytes: usize,
    /// Pause after each chunk (zero = unthrottled).
    pub chunk_delay: Duration,
}

impl Default for BodyServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            chunk_bytes: 64 * 1024,
            chunk_delay: Duration::ZERO,
        }
    }
}

/// Starts a server in a background thread serving `body`. Returns the URL
/// (e.g. "http://127.0.0.1:12345/file"). The server runs until the process exits.
pub fn start(body: Vec<u8>) -> String {
    start_with_options(body, BodyServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: BodyServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            thread::spawn(move || handle(stream, &body, opts));
        }
    });
    format!("http://127.0.0.1:{}/file", port)
}

/// URL of a local port with nothing listening on it.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/file", port)
}

/// URL of a server that accepts connections but never answers.
pub fn stalled_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });
    format!("http://127.0.0.1:{}/file", port)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

fn handle(mut stream: TcpStream, body: &[u8], opts: BodyServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        opts.status,
        reason(opts.status),
        body.len()
    );
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }
    for chunk in body.chunks(opts.chunk_bytes.max(1)) {
        if stream.write_all(chunk).is_err() {
            return;
        }
        let _ = stream.flush();
        if !opts.chunk_delay.is_zero() {
            thread::sleep(opts.chunk_delay);
        }
    }
}
