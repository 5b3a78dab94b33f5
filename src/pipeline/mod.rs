//! Pipeline orchestration: stage sequencing, progress, cancellation and
//! model lifecycle.

pub mod orchestrator;
pub mod progress;

pub use orchestrator::{
    AsrBackend, Orchestrator, PipelineOptions, RunHandle, StyleBackend, WhisperBackend,
};
pub use progress::{ProgressUpdate, RunOutcome, Stage};
