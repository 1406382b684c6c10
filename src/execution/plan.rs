//! Stage planning - resolves which jobs run or skip for a trigger context
//!
//! Planning is a pure pass over the pipeline: no processes are spawned and
//! no state changes, so it backs both the engine's per-stage selection and
//! the `plan` dry-run command.

use crate::core::{Pipeline, TriggerContext};
use serde::{Deserialize, Serialize};

/// A job held out of a stage, with the reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedJob {
    pub name: String,
    pub reason: String,
}

/// Resolved plan for one stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagePlan {
    pub stage: String,

    /// Jobs eligible to run, in declared order
    pub run: Vec<String>,

    /// Jobs whose run condition is not met
    pub skipped: Vec<SkippedJob>,
}

impl StagePlan {
    /// A stage with zero eligible jobs is vacuous success, not an error
    pub fn is_empty(&self) -> bool {
        self.run.is_empty()
    }
}

/// Plan a single stage against the trigger context
pub fn plan_stage(pipeline: &Pipeline, stage: &str, context: &TriggerContext) -> StagePlan {
    let mut run = Vec::new();
    let mut skipped = Vec::new();

    for job in pipeline.jobs_in_stage(stage) {
        if job.eligible_for(context) {
            run.push(job.name.clone());
        } else {
            skipped.push(SkippedJob {
                name: job.name.clone(),
                reason: format!("ref '{}' does not match only: restriction", context.git_ref),
            });
        }
    }

    StagePlan {
        stage: stage.to_string(),
        run,
        skipped,
    }
}

/// Plan every stage of the pipeline, in stage order
pub fn plan_pipeline(pipeline: &Pipeline, context: &TriggerContext) -> Vec<StagePlan> {
    pipeline
        .stages
        .iter()
        .map(|stage| plan_stage(pipeline, stage, context))
        .collect()
}
