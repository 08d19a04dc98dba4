use crossbeam_channel::{Sender, select};
use log::{debug, error, info};
use std::io::Read;
use std::thread::{self, JoinHandle};

use crate::error::IngestError;
use crate::pipeline::{
    self, CancelToken, DispatchSummary, OutcomeStream, PipelineChannels, PipelineTuning,
    RowSource, WorkerStats,
};
use crate::{Header, IngestOpts, Outcome, Record, RunSummary};

/// Start header → dispatcher → workers → stream. The header is parsed on the calling thread, so
/// [`IngestError::MalformedInput`] comes back here before any thread is spawned.
pub fn run_pipeline<R>(
    reader: R,
    opts: &IngestOpts,
    cancel: &CancelToken,
) -> Result<OutcomeStream, IngestError>
where
    R: Read + Send + 'static,
{
    opts.validate()?;
    let mut rdr = pipeline::csv_reader(reader, opts.delimiter);
    let header = pipeline::read_header(&mut rdr)?;

    let tuning = PipelineTuning::for_workers(opts.workers);
    debug!(
        "pipeline: {} workers, queue cap {}, result cap {}",
        tuning.num_workers, tuning.queue_cap, tuning.result_cap
    );
    let PipelineChannels {
        job_tx,
        job_rx,
        outcome_tx,
        outcome_rx,
    } = pipeline::create_pipeline_channels(&tuning);

    let halt = CancelToken::new();
    let dispatcher =
        pipeline::spawn_dispatcher(RowSource::new(rdr), job_tx, cancel.clone(), halt.clone());
    let workers =
        pipeline::spawn_workers(&job_rx, &outcome_tx, &header, tuning.num_workers, cancel);

    // Workers own the only receivers now; if they all exit the dispatcher's push fails.
    drop(job_rx);

    let supervisor = spawn_supervisor(dispatcher, workers, outcome_tx, cancel.clone());
    Ok(OutcomeStream::new(
        header,
        outcome_rx,
        supervisor,
        cancel.clone(),
        halt,
    ))
}

/// Fan-in barrier: join the dispatcher and every worker, publish a held-back read failure, then
/// drop the last outcome sender so the stream closes. Returns run totals.
///
/// The read failure goes out only after the workers have exited, so it always follows the
/// outcomes of the rows read before it.
fn spawn_supervisor(
    dispatcher: JoinHandle<DispatchSummary>,
    workers: Vec<JoinHandle<WorkerStats>>,
    outcome_tx: Sender<Outcome>,
    cancel: CancelToken,
) -> JoinHandle<RunSummary> {
    thread::spawn(move || {
        let mut summary = RunSummary::default();
        let mut stopped_early = false;
        let mut read_failure = None;
        match dispatcher.join() {
            Ok(d) => {
                summary.rows_dispatched = d.dispatched;
                read_failure = d.read_failure;
                stopped_early |= d.cancelled;
            }
            Err(_) => {
                error!("dispatcher thread panicked");
                summary.panicked += 1;
            }
        }
        for h in workers {
            match h.join() {
                Ok(w) => {
                    summary.records += w.records;
                    summary.errors += w.errors;
                    stopped_early |= w.cancelled;
                }
                Err(_) => {
                    error!("worker thread panicked");
                    summary.panicked += 1;
                }
            }
        }
        if let Some(e) = read_failure
            && !cancel.is_cancelled()
        {
            let published = select! {
                send(outcome_tx, Outcome::Error(e)) -> res => res.is_ok(),
                recv(cancel.receiver()) -> _ => false,
            };
            summary.errors += usize::from(published);
        }
        drop(outcome_tx);
        summary.cancelled = stopped_early && cancel.is_cancelled();
        if summary.cancelled {
            info!(
                "Cancelled after {} rows ({} records, {} errors published)",
                summary.rows_dispatched, summary.records, summary.errors
            );
        } else {
            debug!("supervisor: stream closed, {:?}", summary);
        }
        summary
    })
}

/// Parallel outcomes drained into memory. See [`collect_outcomes`].
#[derive(Debug)]
pub struct CollectedOutcomes {
    pub header: Header,
    pub records: Vec<Record>,
    pub errors: Vec<IngestError>,
    pub summary: RunSummary,
}

/// Run the parallel pipeline and drain the whole stream. Records arrive in worker order, not
/// input order.
pub fn collect_outcomes<R>(
    reader: R,
    opts: &IngestOpts,
    cancel: &CancelToken,
) -> Result<CollectedOutcomes, IngestError>
where
    R: Read + Send + 'static,
{
    let mut stream = run_pipeline(reader, opts, cancel)?;
    let header = stream.header().clone();
    let mut records = Vec::new();
    let mut errors = Vec::new();
    for outcome in stream.by_ref() {
        match outcome {
            Outcome::Record(r) => records.push(r),
            Outcome::Error(e) => errors.push(e),
        }
    }
    debug!(
        "main: stream closed, {} records, {} errors",
        records.len(),
        errors.len()
    );
    let summary = stream.finish()?;
    Ok(CollectedOutcomes {
        header,
        records,
        errors,
        summary,
    })
}

/// Sequential path: no threads, input order preserved, stops at the first bad row or read failure.
pub fn read_records_sequential<R: Read>(
    reader: R,
    opts: &IngestOpts,
) -> Result<Vec<Record>, IngestError> {
    let mut rdr = pipeline::csv_reader(reader, opts.delimiter);
    let header = pipeline::read_header(&mut rdr)?;
    RowSource::new(rdr)
        .map(|next| next.and_then(|job| header.zip(job.row, job.line)))
        .collect()
}
