use anyhow::{Context, Result};
use rand::Rng;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::records::TimeSeriesEvent;

/// Default event file, relative to the working directory
pub const DEFAULT_OUTFILE: &str = "events.in";

/// Append `count` random events to `path` as newline-delimited JSON.
///
/// Existing content is kept; each call adds exactly `count` lines.
pub fn time_series<P: AsRef<Path>, R: Rng + ?Sized>(
    path: P,
    count: usize,
    rng: &mut R,
) -> Result<usize> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut out = BufWriter::new(file);

    for _ in 0..count {
        let event = TimeSeriesEvent::random(rng);
        serde_json::to_writer(&mut out, &event)?;
        out.write_all(b"\n")?;
    }
    out.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(count, path = %path.display(), "appended time series events");
    Ok(count)
}
