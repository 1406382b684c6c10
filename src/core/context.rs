//! Trigger context - metadata about the event that started the run

use crate::core::{Job, Pipeline};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Context for a pipeline run
///
/// Carries the branch/ref that triggered the run plus any variable
/// overrides supplied by the invoker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerContext {
    /// Name of the branch/ref that initiated the run
    pub git_ref: String,

    /// Variable overrides (highest precedence)
    pub variables: HashMap<String, String>,
}

impl TriggerContext {
    /// Create a context for the given ref
    pub fn new(git_ref: impl Into<String>) -> Self {
        Self {
            git_ref: git_ref.into(),
            variables: HashMap::new(),
        }
    }

    /// Set a variable override
    pub fn set_variable(&mut self, key: String, value: String) {
        self.variables.insert(key, value);
    }

    /// Build the environment a job's commands see
    ///
    /// Precedence, lowest to highest: pipeline variables, job variables,
    /// invoker overrides, builtin CI variables.
    pub fn job_environment(&self, pipeline: &Pipeline, job: &Job) -> HashMap<String, String> {
        let mut env = pipeline.variables.clone();
        env.extend(job.variables.clone());
        env.extend(self.variables.clone());

        env.insert("CI".to_string(), "true".to_string());
        env.insert("CI_COMMIT_REF_NAME".to_string(), self.git_ref.clone());
        env.insert("CI_JOB_NAME".to_string(), job.name.clone());
        env.insert("CI_JOB_STAGE".to_string(), job.stage.clone());
        env.insert(
            "CI_PIPELINE_ID".to_string(),
            pipeline.state.run_id.to_string(),
        );

        env
    }
}
