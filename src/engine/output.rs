//! JSON-lines output for records.

use anyhow::{Context, Result};
use std::io::Write;

use crate::Record;

/// Write `record` as one compact JSON object followed by a newline.
pub fn write_record<W: Write>(out: &mut W, record: &Record) -> Result<()> {
    serde_json::to_writer(&mut *out, record).context("serialize record")?;
    out.write_all(b"\n").context("write record")?;
    Ok(())
}

/// Counts for the end-of-run log line.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutputReport {
    pub written: usize,
    pub failed: usize,
}
