//! Pipeline configuration from YAML

use crate::core::condition::RefPattern;
use crate::core::Pipeline;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Errors for malformed pipeline descriptions
///
/// All of these are fatal: the run aborts before any job executes.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read pipeline file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed pipeline YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("pipeline declares no stages")]
    NoStages,

    #[error("duplicate stage name: {0}")]
    DuplicateStage(String),

    #[error("pipeline defines no jobs")]
    NoJobs,

    #[error("duplicate job name: {0}")]
    DuplicateJob(String),

    #[error("job '{job}' references unknown stage '{stage}'")]
    UnknownStage { job: String, stage: String },

    #[error("job '{0}' has an empty script")]
    EmptyScript(String),

    #[error("job '{job}' has an invalid ref pattern '{pattern}': {source}")]
    BadRefPattern {
        job: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name (optional)
    #[serde(default)]
    pub name: Option<String>,

    /// Ordered stage names; a stage is a barrier between job groups
    #[serde(default = "default_stages")]
    pub stages: Vec<String>,

    /// Global variables exported into every job's environment
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Job definitions, in declared order
    pub jobs: Vec<JobConfig>,

    /// Default per-command timeout for jobs (in seconds)
    #[serde(default)]
    pub default_timeout_secs: Option<u64>,
}

/// Job configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Unique job name
    pub name: String,

    /// Stage this job belongs to
    #[serde(default = "default_stage")]
    pub stage: String,

    /// Setup commands, run in order before the script
    #[serde(default)]
    pub before_script: Vec<String>,

    /// Script commands, run in order; first non-zero exit aborts the job
    pub script: Vec<String>,

    /// Ref restriction: job runs only when the trigger ref matches one entry.
    /// Entries wrapped in `/.../` are regexes, anything else is an exact name.
    #[serde(default)]
    pub only: Option<Vec<String>>,

    /// Artifact paths preserved after the job succeeds
    #[serde(default)]
    pub artifacts: Option<ArtifactsConfig>,

    /// Job-level variables (override pipeline variables)
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Per-command timeout for this job (overrides the pipeline default)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Artifact configuration for a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Filesystem paths to preserve after the job completes
    pub paths: Vec<String>,
}

fn default_stages() -> Vec<String> {
    vec![
        "build".to_string(),
        "test".to_string(),
        "deploy".to_string(),
    ]
}

fn default_stage() -> String {
    "test".to_string()
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SpecError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, SpecError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.stages.is_empty() {
            return Err(SpecError::NoStages);
        }

        let mut seen_stages = HashSet::new();
        for stage in &self.stages {
            if !seen_stages.insert(stage.as_str()) {
                return Err(SpecError::DuplicateStage(stage.clone()));
            }
        }

        if self.jobs.is_empty() {
            return Err(SpecError::NoJobs);
        }

        let mut seen_jobs = HashSet::new();
        for job in &self.jobs {
            if !seen_jobs.insert(job.name.as_str()) {
                return Err(SpecError::DuplicateJob(job.name.clone()));
            }

            if !seen_stages.contains(job.stage.as_str()) {
                return Err(SpecError::UnknownStage {
                    job: job.name.clone(),
                    stage: job.stage.clone(),
                });
            }

            if job.script.is_empty() {
                return Err(SpecError::EmptyScript(job.name.clone()));
            }

            if let Some(only) = &job.only {
                for raw in only {
                    RefPattern::parse(raw).map_err(|source| SpecError::BadRefPattern {
                        job: job.name.clone(),
                        pattern: raw.clone(),
                        source,
                    })?;
                }
            }
        }

        Ok(())
    }

    /// Convert config to a Pipeline domain model
    pub fn to_pipeline(&self) -> Pipeline {
        Pipeline::from_config(self)
    }
}
