//! Job dispatcher: drains the row source into the bounded job queue.

use crossbeam_channel::{Receiver, Sender, bounded, select};
use log::{debug, warn};
use std::cell::Cell;
use std::io::Read;
use std::iter;
use std::thread::{self, JoinHandle};

use crate::Job;
use crate::error::IngestError;

use super::cancel::CancelToken;
use super::source::RowSource;

/// What the dispatcher did before it stopped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Jobs accepted by the queue.
    pub dispatched: usize,
    /// Terminal read failure, held back until every queued job has produced its outcome.
    pub read_failure: Option<IngestError>,
    /// Stopped because the token fired (or every worker went away).
    pub cancelled: bool,
}

/// Reader thread: pulls rows off `source` and hands each one over a rendezvous channel, so at most
/// one row is read ahead of the dispatcher. Checks `cancel` before every read.
///
/// Detached on purpose: a read blocked in the OS can't be interrupted, so nothing waits for this
/// thread. Once the dispatcher is gone the next handoff fails and the thread exits.
fn spawn_row_reader<R>(
    mut source: RowSource<R>,
    cancel: CancelToken,
) -> Receiver<Result<Job, IngestError>>
where
    R: Read + Send + 'static,
{
    let (row_tx, row_rx) = bounded(0);
    thread::spawn(move || {
        while !cancel.is_cancelled() {
            let Some(next) = source.next() else { break };
            if row_tx.send(next).is_err() {
                break;
            }
        }
        debug!("reader: stopped after {} rows", source.rows_read());
    });
    row_rx
}

/// Spawn the reader and the dispatcher. The returned handle is the dispatcher's; it never waits
/// on a blocked read.
///
/// `halt` is the stream's own stop signal. It ends the wait for the next row like `cancel` does,
/// but leaves the caller's token untouched.
pub fn spawn_dispatcher<R>(
    source: RowSource<R>,
    job_tx: Sender<Job>,
    cancel: CancelToken,
    halt: CancelToken,
) -> JoinHandle<DispatchSummary>
where
    R: Read + Send + 'static,
{
    let row_rx = spawn_row_reader(source, cancel.clone());
    thread::spawn(move || {
        let cancelled_waiting = Cell::new(false);
        let rows = iter::from_fn(|| {
            select! {
                recv(row_rx) -> msg => msg.ok(),
                recv(cancel.receiver()) -> _ => {
                    cancelled_waiting.set(true);
                    None
                }
                recv(halt.receiver()) -> _ => {
                    debug!("dispatcher: stream finished, no more rows wanted");
                    None
                }
            }
        });
        let mut summary = run_dispatch_loop(rows, job_tx, &cancel);
        summary.cancelled |= cancelled_waiting.get();
        summary
    })
}

/// Run the dispatch loop: pull from `rows`, push each job onto `job_tx`.
///
/// Every push races `cancel`. A read failure ends the loop and is returned in the summary for the
/// supervisor to publish once the workers are done. `job_tx` is dropped on return, which closes
/// the queue for the workers.
pub fn run_dispatch_loop<I>(rows: I, job_tx: Sender<Job>, cancel: &CancelToken) -> DispatchSummary
where
    I: IntoIterator<Item = Result<Job, IngestError>>,
{
    let mut summary = DispatchSummary::default();
    let mut rows = rows.into_iter();
    loop {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }
        let Some(next) = rows.next() else { break };
        match next {
            Ok(job) => {
                let pushed = select! {
                    send(job_tx, job) -> res => res.is_ok(),
                    recv(cancel.receiver()) -> _ => false,
                };
                if !pushed {
                    summary.cancelled = true;
                    break;
                }
                summary.dispatched += 1;
            }
            Err(e) => {
                warn!("{e}; no further rows will be read");
                summary.read_failure = Some(e);
                break;
            }
        }
    }
    drop(job_tx);
    debug!(
        "dispatcher: done, {} jobs queued (read_failed={}, cancelled={})",
        summary.dispatched,
        summary.read_failure.is_some(),
        summary.cancelled
    );
    summary
}
