//! Public and internal types for the csvfan API and pipeline.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::IngestError;
use crate::utils::config::default_workers;

/// Labeled row: field name → cell value. Built by zipping a row against the [`Header`].
///
/// Map order is by field name; only the header's column order matters for zipping.
pub type Record = BTreeMap<String, String>;

/// One data row as read from the input: ordered cells, no labels yet.
pub type Row = Vec<String>;

/// Ordered field names from the first input row. Fixed for the whole run.
///
/// Cheap to clone (shared slice); every worker holds its own handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header(Arc<[String]>);

impl Header {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields.into())
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pair `row` with the field names positionally.
    ///
    /// Fails with [`IngestError::RowCardinalityMismatch`] when the cell count differs from the
    /// header length. `line` is only used to label the error.
    pub fn zip(&self, row: Row, line: u64) -> Result<Record, IngestError> {
        if row.len() != self.len() {
            return Err(IngestError::RowCardinalityMismatch {
                line,
                expected: self.len(),
                found: row.len(),
            });
        }
        Ok(self.0.iter().cloned().zip(row).collect())
    }
}

/// A row in transit through the job queue, with the 1-based input line it started on.
#[derive(Clone, Debug)]
pub struct Job {
    pub line: u64,
    pub row: Row,
}

/// Unit flowing through the result stream: a finished record or the reason a row produced none.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Record(Record),
    Error(IngestError),
}

impl Outcome {
    pub fn is_record(&self) -> bool {
        matches!(self, Outcome::Record(_))
    }

    pub fn into_result(self) -> Result<Record, IngestError> {
        match self {
            Outcome::Record(r) => Ok(r),
            Outcome::Error(e) => Err(e),
        }
    }
}

impl From<Result<Record, IngestError>> for Outcome {
    fn from(r: Result<Record, IngestError>) -> Self {
        match r {
            Ok(record) => Outcome::Record(record),
            Err(e) => Outcome::Error(e),
        }
    }
}

/// Lib options for [`ingest`](crate::ingest) and [`read_records`](crate::read_records).
#[derive(Clone, Debug)]
pub struct IngestOpts {
    /// Worker thread count. Must be at least 1; there is no upper bound.
    pub workers: usize,
    /// Field delimiter byte (default `,`).
    pub delimiter: u8,
}

impl Default for IngestOpts {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            delimiter: b',',
        }
    }
}

impl IngestOpts {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            delimiter: b',',
        }
    }

    pub(crate) fn validate(&self) -> Result<(), IngestError> {
        if self.workers == 0 {
            return Err(IngestError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Totals reported by the supervisor once every pipeline thread has exited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows the dispatcher pushed onto the job queue.
    pub rows_dispatched: usize,
    /// Record outcomes published by workers.
    pub records: usize,
    /// Error outcomes published (row mismatches plus a terminal read failure, if any).
    pub errors: usize,
    /// True when the cancellation token fired before the run finished on its own.
    pub cancelled: bool,
    /// Threads that panicked instead of returning.
    pub panicked: usize,
}

/// Full options for the CLI. Use [`IngestOpts`] for lib.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    pub ingest: IngestOpts,
    /// Run the single-threaded path and fail on the first bad row.
    pub sequential: bool,
    /// Exit with an error when any error outcome was seen.
    pub strict: bool,
    /// Debug logging.
    pub verbose: bool,
    /// Show a row counter on stderr.
    pub progress: bool,
}
