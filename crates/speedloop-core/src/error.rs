//! Error types: fatal config errors and per-transfer measurement errors.

use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration failure. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed URL list {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("settings: {0}")]
    Settings(String),
}

/// Terminal failure of one transfer. Carried inside a `Sample`, never fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    /// The curl handle rejected an option (e.g. malformed URL).
    #[error("request setup failed: {0}")]
    Setup(String),
    /// DNS, TCP or TLS failure before any response headers arrived.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Failure after the body started streaming.
    #[error("read failed: {0}")]
    Read(String),
    /// Final response status outside 2xx.
    #[error("HTTP {0}")]
    Http(u32),
}

/// Transfer phase used to classify libcurl errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Streaming,
}

/// Classify a curl error by the phase it happened in.
///
/// Resolve/connect/TLS handshake errors are always connection errors; anything
/// else is a read error once headers have arrived.
pub fn classify_curl_error(e: &curl::Error, phase: Phase) -> MeasureError {
    let msg = describe(e);
    if e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_couldnt_connect()
        || e.is_ssl_connect_error()
    {
        return MeasureError::Connect(msg);
    }
    match phase {
        Phase::Connecting => MeasureError::Connect(msg),
        Phase::Streaming => MeasureError::Read(msg),
    }
}

fn describe(e: &curl::Error) -> String {
    match e.extra_description() {
        Some(extra) if !extra.is_empty() => format!("{} ({})", e.description(), extra),
        _ => e.description().to_string(),
    }
}
