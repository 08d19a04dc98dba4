use crossbeam_channel::{Receiver, Sender, select};
use log::debug;
use std::thread::{self, JoinHandle};

use crate::{Header, Job, Outcome};

use super::cancel::CancelToken;

/// Per-worker totals, collected by the supervisor on join.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub records: usize,
    pub errors: usize,
    /// Left early because the token fired or the stream consumer went away.
    pub cancelled: bool,
}

enum Pull {
    Job(Job),
    Closed,
    Cancelled,
}

impl From<Option<Job>> for Pull {
    fn from(msg: Option<Job>) -> Self {
        msg.map_or(Pull::Closed, Pull::Job)
    }
}

/// Turn one job into its outcome: a record when the cell count matches the header, otherwise a
/// cardinality error. Cells are paired with field names by position only.
pub fn job_to_outcome(header: &Header, job: Job) -> Outcome {
    header.zip(job.row, job.line).into()
}

/// Single worker: pull jobs from `job_rx`, publish one outcome per job on `outcome_tx`.
/// Exits when the queue is closed and empty, or as soon as `cancel` fires during a pull or
/// publish. An outcome interrupted by cancellation is dropped, not published.
fn worker_loop(
    id: usize,
    job_rx: Receiver<Job>,
    outcome_tx: Sender<Outcome>,
    header: Header,
    cancel: CancelToken,
) -> WorkerStats {
    let mut stats = WorkerStats::default();
    loop {
        if cancel.is_cancelled() {
            stats.cancelled = true;
            break;
        }
        let pulled = select! {
            recv(job_rx) -> msg => Pull::from(msg.ok()),
            recv(cancel.receiver()) -> _ => Pull::Cancelled,
        };
        let job = match pulled {
            Pull::Job(job) => job,
            Pull::Closed => break,
            Pull::Cancelled => {
                stats.cancelled = true;
                break;
            }
        };
        let outcome = job_to_outcome(&header, job);
        let is_record = outcome.is_record();
        if let Outcome::Error(e) = &outcome {
            debug!("worker {id}: {e}");
        }
        let published = select! {
            send(outcome_tx, outcome) -> res => res.is_ok(),
            recv(cancel.receiver()) -> _ => false,
        };
        if !published {
            stats.cancelled = true;
            break;
        }
        if is_record {
            stats.records += 1;
        } else {
            stats.errors += 1;
        }
    }
    drop(outcome_tx);
    debug!(
        "worker {id}: exit ({} records, {} errors)",
        stats.records, stats.errors
    );
    stats
}

/// Spawn `num_workers` workers sharing `job_rx`. Each gets its own clone of `outcome_tx`; the
/// caller keeps the original and decides when the stream closes.
pub fn spawn_workers(
    job_rx: &Receiver<Job>,
    outcome_tx: &Sender<Outcome>,
    header: &Header,
    num_workers: usize,
    cancel: &CancelToken,
) -> Vec<JoinHandle<WorkerStats>> {
    (0..num_workers)
        .map(|id| {
            let job_rx = job_rx.clone();
            let outcome_tx = outcome_tx.clone();
            let header = header.clone();
            let cancel = cancel.clone();
            thread::spawn(move || worker_loop(id, job_rx, outcome_tx, header, cancel))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crossbeam_channel::bounded;

    fn header() -> Header {
        Header::new(vec!["title".into(), "author".into()])
    }

    fn job(line: u64, cells: &[&str]) -> Job {
        Job {
            line,
            row: cells.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_job_to_outcome_zips_by_position() {
        match job_to_outcome(&header(), job(2, &["A", "B"])) {
            Outcome::Record(r) => {
                assert_eq!(r["title"], "A");
                assert_eq!(r["author"], "B");
                assert_eq!(r.len(), 2);
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_job_to_outcome_reports_mismatch() {
        let outcome = job_to_outcome(&header(), job(3, &["C"]));
        assert_eq!(
            outcome,
            Outcome::Error(IngestError::RowCardinalityMismatch {
                line: 3,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn test_worker_drains_queue_then_exits() {
        let (job_tx, job_rx) = bounded(4);
        let (outcome_tx, outcome_rx) = bounded(4);
        job_tx.send(job(2, &["A", "B"])).unwrap();
        job_tx.send(job(3, &["C"])).unwrap();
        drop(job_tx);
        let stats = worker_loop(0, job_rx, outcome_tx, header(), CancelToken::new());
        assert_eq!((stats.records, stats.errors, stats.cancelled), (1, 1, false));
        let outcomes: Vec<_> = outcome_rx.iter().collect();
        assert_eq!(outcomes.len(), 2);
    }

    #[test]
    fn test_worker_exits_when_publish_blocked_and_cancelled() {
        let (job_tx, job_rx) = bounded(4);
        let (outcome_tx, outcome_rx) = bounded(0);
        job_tx.send(job(2, &["A", "B"])).unwrap();
        let cancel = CancelToken::new();
        let handle = spawn_workers(&job_rx, &outcome_tx, &header(), 1, &cancel);
        drop(outcome_tx);
        thread::sleep(std::time::Duration::from_millis(20));
        cancel.cancel();
        for h in handle {
            let stats = h.join().unwrap();
            assert!(stats.cancelled);
            assert_eq!(stats.records, 0);
        }
        assert!(outcome_rx.try_recv().is_err());
        drop(job_tx);
    }
}
