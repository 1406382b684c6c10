//! Pipeline execution engine

pub mod engine;
pub mod executor;
pub mod plan;
pub mod report;
pub mod runner;

pub use engine::{ExecutionEngine, ExecutionEvent, SchedulingStrategy};
pub use executor::{JobExecutor, JobOutcome, JobResult};
pub use plan::{plan_pipeline, plan_stage, StagePlan};
pub use report::{ArtifactRecord, CommandPhase, CommandRecord, PipelineReport};
pub use runner::{CommandOutput, CommandRunner, RunnerError, ShellRunner};
