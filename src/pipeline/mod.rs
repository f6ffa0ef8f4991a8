//! Local orchestration: bundle directory in, persisted descriptor out
//!
//! Retrieval and archive extraction happen before this layer; the pipeline
//! starts from an already extracted directory.

mod orchestrator;
mod output;

pub use orchestrator::DeployPipeline;
pub use output::PipelineOutput;
