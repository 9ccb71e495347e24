//! Throughput samples emitted by the measurement engine.

use crate::error::MeasureError;
use std::time::Duration;

/// One throughput observation for a single URL.
///
/// When `error` is set the sample marks a failed transfer and every other
/// numeric field is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub url: String,
    /// Cumulative body bytes received since the transfer started.
    pub size_bytes: u64,
    /// Time since the response headers arrived.
    pub elapsed: Duration,
    /// Megabytes (10^6 bytes) per second.
    pub speed_mbytes_per_sec: f64,
    /// Megabits (10^6 bits) per second.
    pub speed_mbits_per_sec: f64,
    pub error: Option<MeasureError>,
}

impl Sample {
    /// Progress or final sample for `size_bytes` received over `elapsed`.
    pub fn measured(url: &str, size_bytes: u64, elapsed: Duration) -> Self {
        let (mbytes, mbits) = speeds(size_bytes, elapsed);
        Self {
            url: url.to_string(),
            size_bytes,
            elapsed,
            speed_mbytes_per_sec: mbytes,
            speed_mbits_per_sec: mbits,
            error: None,
        }
    }

    /// Terminal error sample.
    pub fn failed(url: &str, error: MeasureError) -> Self {
        Self {
            url: url.to_string(),
            size_bytes: 0,
            elapsed: Duration::ZERO,
            speed_mbytes_per_sec: 0.0,
            speed_mbits_per_sec: 0.0,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Size in megabytes (10^6 bytes).
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1e6
    }
}

/// (MB/s, Mbps). Zero when no time has passed.
fn speeds(bytes: u64, elapsed: Duration) -> (f64, f64) {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return (0.0, 0.0);
    }
    let mbytes = bytes as f64 / 1e6 / secs;
    let mbits = bytes as f64 * 8.0 / 1e6 / secs;
    (mbytes, mbits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speeds_from_bytes_and_elapsed() {
        let s = Sample::measured("http://x/", 2_000_000, Duration::from_secs(2));
        assert!((s.speed_mbytes_per_sec - 1.0).abs() < 1e-9);
        assert!((s.speed_mbits_per_sec - 8.0).abs() < 1e-9);
        assert!((s.size_mb() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn mbits_is_eight_times_mbytes() {
        for (bytes, millis) in [(1u64, 1u64), (32_768, 7), (1_000_000, 1234), (u32::MAX as u64, 999)] {
            let s = Sample::measured("u", bytes, Duration::from_millis(millis));
            let ratio_err = (s.speed_mbits_per_sec - s.speed_mbytes_per_sec * 8.0).abs();
            assert!(ratio_err <= 1e-9 * s.speed_mbits_per_sec.max(1.0), "bytes={bytes}");
        }
    }

    #[test]
    fn zero_elapsed_gives_zero_speed() {
        let s = Sample::measured("u", 1024, Duration::ZERO);
        assert_eq!(s.speed_mbytes_per_sec, 0.0);
        assert_eq!(s.speed_mbits_per_sec, 0.0);
        assert_eq!(s.size_bytes, 1024);
    }

    #[test]
    fn failed_sample_is_zeroed() {
        let s = Sample::failed("u", MeasureError::Http(500));
        assert!(s.is_error());
        assert_eq!(s.size_bytes, 0);
        assert_eq!(s.elapsed, Duration::ZERO);
        assert_eq!(s.speed_mbytes_per_sec, 0.0);
    }
}
