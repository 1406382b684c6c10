//! Run report - the serializable outcome of a pipeline run
//!
//! Sufficient to reconstruct which jobs ran, skipped, or failed, and the
//! ordered log of every command that executed.

use crate::core::{ExecutionStatus, JobState, Pipeline, TriggerContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Which command list a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandPhase {
    /// A `before_script` command
    Setup,
    /// A `script` command
    Main,
}

/// One executed command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub job: String,
    pub phase: CommandPhase,
    pub command: String,
    pub exit_code: i32,
    pub duration_ms: u64,
}

/// An artifact path declared by a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub job: String,
    pub path: PathBuf,
    /// Whether the path existed on disk after the job succeeded
    pub collected: bool,
}

/// Per-job outcome in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub name: String,
    pub stage: String,
    pub state: JobState,
}

/// Final outcome of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub pipeline_name: String,
    pub git_ref: String,
    pub status: ExecutionStatus,

    /// Stage that halted the run, if any
    pub failed_stage: Option<String>,

    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    pub jobs: Vec<JobReport>,

    /// Ordered log of every command that executed
    pub commands: Vec<CommandRecord>,

    pub artifacts: Vec<ArtifactRecord>,
}

impl PipelineReport {
    /// Check if the run as a whole succeeded
    pub fn succeeded(&self) -> bool {
        self.status == ExecutionStatus::Succeeded
    }

    /// Look up the report for a single job
    pub fn job(&self, name: &str) -> Option<&JobReport> {
        self.jobs.iter().find(|j| j.name == name)
    }
}

/// Build the report for a finished (or halted) pipeline
pub fn create_report(
    pipeline: &Pipeline,
    context: &TriggerContext,
    failed_stage: Option<String>,
    commands: Vec<CommandRecord>,
    artifacts: Vec<ArtifactRecord>,
) -> PipelineReport {
    PipelineReport {
        run_id: pipeline.state.run_id,
        pipeline_name: pipeline.name.clone(),
        git_ref: context.git_ref.clone(),
        status: pipeline.state.status,
        failed_stage,
        started_at: pipeline.state.started_at,
        finished_at: pipeline.state.finished_at,
        jobs: pipeline
            .jobs
            .iter()
            .map(|job| JobReport {
                name: job.name.clone(),
                stage: job.stage.clone(),
                state: job.state.clone(),
            })
            .collect(),
        commands,
        artifacts,
    }
}
