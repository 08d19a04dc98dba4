//! Pipeline components: header, row source, dispatcher, workers, result stream, cancellation.
//!
//! Input → [`read_header`] → [`RowSource`] → dispatcher → job queue (cap 2×N) → N workers →
//! outcome stream (cap N) → caller. A supervisor thread joins everything before the stream ends.

pub mod cancel;
pub mod context;
pub mod dispatch;
pub mod header;
pub mod orchestrator;
pub mod source;
pub mod stream;
pub mod worker;

pub use cancel::CancelToken;
pub use context::{PipelineChannels, PipelineTuning, create_pipeline_channels};
pub use dispatch::{DispatchSummary, run_dispatch_loop, spawn_dispatcher};
pub use header::read_header;
pub use orchestrator::{
    CollectedOutcomes, collect_outcomes, read_records_sequential, run_pipeline,
};
pub use source::{RowSource, csv_reader};
pub use stream::OutcomeStream;
pub use worker::{WorkerStats, job_to_outcome, spawn_workers};
