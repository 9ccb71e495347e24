//! Console formatting for samples.

use crate::sample::Sample;
use std::io::{self, Write};

/// Human-readable block for one sample, ending with a blank line.
///
/// Error samples print a failure line instead of size/time/speed so they
/// cannot be mistaken for a zero-byte download.
pub fn format_sample(sample: &Sample) -> String {
    match &sample.error {
        Some(err) => format!("✗ {}\n  Error:    {}\n\n", sample.url, err),
        None => format!(
            "✓ {}\n  Size:     {:.2} MB\n  Time:     {:.3?}\n  Speed:    {:.2} MB/s ({:.2} Mbps)\n\n",
            sample.url,
            sample.size_mb(),
            sample.elapsed,
            sample.speed_mbytes_per_sec,
            sample.speed_mbits_per_sec
        ),
    }
}

pub fn write_sample<W: Write>(out: &mut W, sample: &Sample) -> io::Result<()> {
    out.write_all(format_sample(sample).as_bytes())?;
    out.flush()
}
