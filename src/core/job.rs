//! Job domain model

use crate::core::{
    condition::RunCondition,
    config::JobConfig,
    context::TriggerContext,
    state::JobState,
};
use std::collections::HashMap;
use std::path::PathBuf;

/// A single job in a pipeline
#[derive(Debug, Clone)]
pub struct Job {
    /// Unique job name
    pub name: String,

    /// Stage this job belongs to
    pub stage: String,

    /// Setup commands, run before the script
    pub before_script: Vec<String>,

    /// Script commands
    pub script: Vec<String>,

    /// Compiled run condition (None = always runs)
    pub condition: Option<RunCondition>,

    /// Artifact paths collected after success
    pub artifact_paths: Vec<PathBuf>,

    /// Job-level variables
    pub variables: HashMap<String, String>,

    /// Per-command timeout in seconds
    pub timeout_secs: u64,

    /// Runtime state
    pub state: JobState,
}

/// Defaults applied to jobs that don't override them
#[derive(Debug, Clone)]
pub struct JobDefaults {
    pub timeout_secs: u64,
}

impl Default for JobDefaults {
    fn default() -> Self {
        Self {
            timeout_secs: 3600, // 1 hour, the usual CI job ceiling
        }
    }
}

impl Job {
    /// Create a job from a job config
    ///
    /// Validation has already checked the `only:` patterns, so a pattern
    /// that fails to compile here falls back to an exact match rather
    /// than aborting.
    pub fn from_config(config: &JobConfig, defaults: &JobDefaults) -> Self {
        let condition = config.only.as_ref().map(|raw| {
            RunCondition::from_raw(raw).unwrap_or_else(|_| {
                RunCondition::new(
                    raw.iter()
                        .map(|p| crate::core::condition::RefPattern::Exact(p.clone()))
                        .collect(),
                )
            })
        });

        let artifact_paths = config
            .artifacts
            .as_ref()
            .map(|a| a.paths.iter().map(PathBuf::from).collect())
            .unwrap_or_default();

        Job {
            name: config.name.clone(),
            stage: config.stage.clone(),
            before_script: config.before_script.clone(),
            script: config.script.clone(),
            condition,
            artifact_paths,
            variables: config.variables.clone(),
            timeout_secs: config.timeout_secs.unwrap_or(defaults.timeout_secs),
            state: JobState::Pending,
        }
    }

    /// Check if this job is eligible to run for the given trigger context
    pub fn eligible_for(&self, context: &TriggerContext) -> bool {
        match &self.condition {
            Some(condition) => condition.satisfied_by(&context.git_ref),
            None => true,
        }
    }

    /// Total number of commands the job will run
    pub fn command_count(&self) -> usize {
        self.before_script.len() + self.script.len()
    }
}
