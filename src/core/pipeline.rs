//! Pipeline domain model

use crate::core::{
    config::PipelineConfig,
    job::{Job, JobDefaults},
    state::{ExecutionStatus, JobState, PipelineState},
};
use std::collections::HashMap;

/// A pipeline definition
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Ordered stage names; stage N+1 starts only after all stage-N jobs
    /// reach a terminal state
    pub stages: Vec<String>,

    /// Global variables exported into every job's environment
    pub variables: HashMap<String, String>,

    /// Jobs, in declared order
    pub jobs: Vec<Job>,

    /// Execution state
    pub state: PipelineState,
}

impl Pipeline {
    /// Create a pipeline from configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        let defaults = JobDefaults {
            timeout_secs: config
                .default_timeout_secs
                .unwrap_or_else(|| JobDefaults::default().timeout_secs),
        };

        let jobs = config
            .jobs
            .iter()
            .map(|job_config| Job::from_config(job_config, &defaults))
            .collect();

        Pipeline {
            name: config
                .name
                .clone()
                .unwrap_or_else(|| "pipeline".to_string()),
            stages: config.stages.clone(),
            variables: config.variables.clone(),
            jobs,
            state: PipelineState::new(),
        }
    }

    /// Get a job by name
    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.name == name)
    }

    /// Get a mutable job by name
    pub fn job_mut(&mut self, name: &str) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.name == name)
    }

    /// Get all jobs belonging to a stage, in declared order
    pub fn jobs_in_stage(&self, stage: &str) -> Vec<&Job> {
        self.jobs.iter().filter(|j| j.stage == stage).collect()
    }

    /// Check if every job has reached a terminal state
    pub fn is_complete(&self) -> bool {
        self.jobs.iter().all(|j| j.state.is_terminal())
    }

    /// Check if the pipeline has failed
    pub fn has_failed(&self) -> bool {
        self.state.status == ExecutionStatus::Failed
    }

    /// Recompute the per-state job counts on the pipeline state
    pub fn refresh_counts(&mut self) {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for job in &self.jobs {
            match &job.state {
                JobState::Succeeded { .. } => succeeded += 1,
                JobState::Failed { .. } => failed += 1,
                JobState::Skipped { .. } => skipped += 1,
                _ => {}
            }
        }

        self.state.update_counts(succeeded, failed, skipped);
    }
}
