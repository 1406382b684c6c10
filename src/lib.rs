//! stagehand - a stage-based CI pipeline runner

pub mod cli;
pub mod core;
pub mod execution;

// Re-export commonly used types
pub use crate::core::{ExecutionStatus, Job, JobState, Pipeline, PipelineState, TriggerContext};
pub use crate::execution::{
    CommandOutput, CommandRunner, ExecutionEngine, ExecutionEvent, JobExecutor, PipelineReport,
    RunnerError, SchedulingStrategy, ShellRunner,
};
