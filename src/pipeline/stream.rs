//! Result stream handed back to the caller.

use crossbeam_channel::Receiver;
use std::thread::JoinHandle;

use crate::error::IngestError;
use crate::{Header, Outcome, RunSummary};

use super::cancel::CancelToken;

/// Multiplexed outcomes of every worker for one run.
///
/// Iterate it (or `recv` on [`receiver`](Self::receiver)) until it ends; the end of the stream is
/// the only completion signal and happens once all pipeline threads have exited. Outcome order
/// across workers is unspecified.
pub struct OutcomeStream {
    header: Header,
    outcome_rx: Receiver<Outcome>,
    supervisor: JoinHandle<RunSummary>,
    cancel: CancelToken,
    halt: CancelToken,
}

impl OutcomeStream {
    pub(crate) fn new(
        header: Header,
        outcome_rx: Receiver<Outcome>,
        supervisor: JoinHandle<RunSummary>,
        cancel: CancelToken,
        halt: CancelToken,
    ) -> Self {
        Self {
            header,
            outcome_rx,
            supervisor,
            cancel,
            halt,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Raw receiver, for callers that want to `select!` over the stream and something else.
    pub fn receiver(&self) -> &Receiver<Outcome> {
        &self.outcome_rx
    }

    /// Fire the run's cancellation token (same token the caller passed in).
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stop receiving and wait for the pipeline threads to exit.
    ///
    /// Outcomes not yet received are discarded; workers blocked on publish see the stream gone
    /// and exit. The dispatcher stops waiting for the next row even if the reader is stuck in a
    /// read that never returns. The caller's token is not fired, so the summary only reports
    /// `cancelled` if the caller cancelled.
    pub fn finish(self) -> Result<RunSummary, IngestError> {
        let Self {
            outcome_rx,
            supervisor,
            halt,
            ..
        } = self;
        drop(outcome_rx);
        halt.cancel();
        supervisor
            .join()
            .map_err(|_| IngestError::ThreadPanicked("supervisor"))
    }
}

impl Iterator for OutcomeStream {
    type Item = Outcome;

    fn next(&mut self) -> Option<Outcome> {
        self.outcome_rx.recv().ok()
    }
}
