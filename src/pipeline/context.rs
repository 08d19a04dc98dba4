//! Pipeline tuning and the per-run channel set.

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::utils::config::QueuePolicy;
use crate::{Job, Outcome};

/// Sizes derived from the worker count: thread count, job queue cap, result stream cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineTuning {
    pub num_workers: usize,
    pub queue_cap: usize,
    pub result_cap: usize,
}

impl PipelineTuning {
    pub fn for_workers(num_workers: usize) -> Self {
        Self {
            num_workers,
            queue_cap: num_workers * QueuePolicy::JOBS_PER_WORKER,
            result_cap: num_workers * QueuePolicy::RESULTS_PER_WORKER,
        }
    }
}

/// Channels for one run. Dispatcher gets `job_tx`; workers get `job_rx` and clones of
/// `outcome_tx`; the caller ends up with `outcome_rx`.
pub struct PipelineChannels {
    pub job_tx: Sender<Job>,
    pub job_rx: Receiver<Job>,
    pub outcome_tx: Sender<Outcome>,
    pub outcome_rx: Receiver<Outcome>,
}

pub fn create_pipeline_channels(tuning: &PipelineTuning) -> PipelineChannels {
    let (job_tx, job_rx) = bounded::<Job>(tuning.queue_cap);
    let (outcome_tx, outcome_rx) = bounded::<Outcome>(tuning.result_cap);
    PipelineChannels {
        job_tx,
        job_rx,
        outcome_tx,
        outcome_rx,
    }
}
