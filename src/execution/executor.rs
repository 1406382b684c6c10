//! Job executor - runs one job's commands in sequence

use crate::{
    core::Job,
    execution::{
        report::{ArtifactRecord, CommandPhase, CommandRecord},
        runner::CommandRunner,
    },
};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Result of executing a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    /// Every command exited zero
    Succeeded,
    /// A command exited non-zero; no later command in the job ran
    Failed {
        phase: CommandPhase,
        command: String,
        exit_code: i32,
        /// Captured stderr, or the runner error text when the command
        /// never produced output
        stderr: String,
    },
}

/// Full outcome of a job execution
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub result: JobResult,

    /// Ordered records for every command that actually ran
    pub records: Vec<CommandRecord>,

    /// Artifact records (only populated on success)
    pub artifacts: Vec<ArtifactRecord>,
}

/// Executes a single job
pub struct JobExecutor<R> {
    runner: R,
}

impl<R: CommandRunner> JobExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Run the job's setup commands then script commands, aborting on the
    /// first non-zero exit. Artifacts are only collected after success.
    pub async fn execute(&self, job: &Job, env: &HashMap<String, String>) -> JobOutcome {
        info!("Executing job: {}", job.name);

        let mut records = Vec::with_capacity(job.command_count());

        let commands = job
            .before_script
            .iter()
            .map(|c| (CommandPhase::Setup, c))
            .chain(job.script.iter().map(|c| (CommandPhase::Main, c)));

        for (phase, command) in commands {
            debug!("Job {}: running '{}'", job.name, command);
            let started = Instant::now();

            let (exit_code, stderr) = match self.runner.run(command, env, job.timeout_secs).await {
                Ok(output) => {
                    if !output.success() && !output.stderr.is_empty() {
                        warn!(
                            "Job {}: '{}' stderr: {}",
                            job.name,
                            command,
                            output.stderr.trim()
                        );
                    }
                    (output.exit_code, output.stderr)
                }
                Err(e) => {
                    // Spawn failures map to the shell's command-not-found
                    // code, timeouts to the conventional timeout(1) code.
                    error!("Job {}: '{}' did not run: {}", job.name, command, e);
                    let code = match e {
                        crate::execution::runner::RunnerError::Spawn { .. } => 127,
                        crate::execution::runner::RunnerError::Timeout { .. } => 124,
                    };
                    (code, e.to_string())
                }
            };

            records.push(CommandRecord {
                job: job.name.clone(),
                phase,
                command: command.clone(),
                exit_code,
                duration_ms: started.elapsed().as_millis() as u64,
            });

            if exit_code != 0 {
                error!(
                    "Job {} failed: '{}' exited with code {}",
                    job.name, command, exit_code
                );
                return JobOutcome {
                    result: JobResult::Failed {
                        phase,
                        command: command.clone(),
                        exit_code,
                        stderr,
                    },
                    records,
                    artifacts: Vec::new(),
                };
            }
        }

        let artifacts = self.collect_artifacts(job).await;

        info!("Job {} succeeded", job.name);
        JobOutcome {
            result: JobResult::Succeeded,
            records,
            artifacts,
        }
    }

    /// Record which declared artifact paths exist on disk
    ///
    /// A missing path is a warning, not a job failure.
    async fn collect_artifacts(&self, job: &Job) -> Vec<ArtifactRecord> {
        let mut artifacts = Vec::with_capacity(job.artifact_paths.len());

        for path in &job.artifact_paths {
            let collected = tokio::fs::metadata(path).await.is_ok();
            if !collected {
                warn!(
                    "Job {}: declared artifact path '{}' not found",
                    job.name,
                    path.display()
                );
            }
            artifacts.push(ArtifactRecord {
                job: job.name.clone(),
                path: path.clone(),
                collected,
            });
        }

        artifacts
    }
}
