//! Batch processing

mod orchestrator;

pub use orchestrator::{run, PipelineResult};
