//! csvfan: bounded, cancellable CSV ingestion on a fixed worker pool

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use error::{ErrorKind, IngestError, IngestResult};
pub use pipeline::{CancelToken, CollectedOutcomes, OutcomeStream, collect_outcomes};

use log::debug;
use std::io::Read;

/// Parallel entry point: parse the header from `reader`, then stream one [`Outcome`] per data row
/// (plus at most one read-failure outcome) from `opts.workers` worker threads.
///
/// - Returns `Err(MalformedInput)` immediately when there is no readable header; no threads start.
/// - Order of outcomes across workers is unspecified. Use `workers: 1` or [`read_records`] when
///   input order matters.
/// - `cancel` is owned by the caller. Firing it makes every pipeline thread stop at its next
///   blocking point; the stream then ends without an error outcome.
///
/// ```ignore
/// let cancel = csvfan::CancelToken::new();
/// let opts = csvfan::IngestOpts::with_workers(4);
/// let stream = csvfan::ingest(std::fs::File::open("books.csv")?, &opts, &cancel)?;
/// for outcome in stream {
///     match outcome {
///         csvfan::Outcome::Record(r) => println!("{}", r["title"]),
///         csvfan::Outcome::Error(e) => eprintln!("{e}"),
///     }
/// }
/// ```
pub fn ingest<R>(reader: R, opts: &IngestOpts, cancel: &CancelToken) -> IngestResult<OutcomeStream>
where
    R: Read + Send + 'static,
{
    debug!(
        "{} ingest: workers={} delimiter={:?}",
        env!("CARGO_PKG_NAME"),
        opts.workers,
        opts.delimiter as char
    );
    pipeline::run_pipeline(reader, opts, cancel)
}

/// Sequential entry point: every record in input order, or the first error.
///
/// `opts.workers` is ignored. Row-level problems that the parallel path reports as outcomes
/// (cardinality mismatch, read failure) end the run here.
pub fn read_records<R: Read>(reader: R, opts: &IngestOpts) -> IngestResult<Vec<Record>> {
    pipeline::read_records_sequential(reader, opts)
}
