//! Main execution engine - orchestrates the entire pipeline run
//!
//! Stages run strictly in declared order; every job of a stage must reach a
//! terminal state before the next stage starts. Jobs inside a stage are
//! independent and run with the configured scheduling strategy. A failed
//! stage halts the run; in-flight siblings finish naturally first.

use crate::{
    core::{ExecutionStatus, Job, JobState, Pipeline, TriggerContext},
    execution::{
        executor::{JobExecutor, JobOutcome, JobResult},
        plan::plan_stage,
        report::{create_report, ArtifactRecord, CommandRecord, PipelineReport},
        runner::CommandRunner,
    },
};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Strategy for scheduling jobs within a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingStrategy {
    /// One job at a time, in declared order
    Sequential,

    /// All eligible jobs of the stage at once
    Parallel,

    /// At most N concurrent jobs
    LimitedParallel(usize),
}

impl SchedulingStrategy {
    fn max_concurrent(&self) -> usize {
        match self {
            SchedulingStrategy::Sequential => 1,
            SchedulingStrategy::Parallel => usize::MAX,
            SchedulingStrategy::LimitedParallel(max) => (*max).max(1),
        }
    }
}

impl Default for SchedulingStrategy {
    fn default() -> Self {
        SchedulingStrategy::Parallel
    }
}

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        run_id: Uuid,
        pipeline_name: String,
        git_ref: String,
    },
    StageStarted {
        stage: String,
        eligible: usize,
    },
    JobSkipped {
        job: String,
        reason: String,
    },
    JobStarted {
        job: String,
        stage: String,
    },
    JobSucceeded {
        job: String,
    },
    JobFailed {
        job: String,
        command: String,
        exit_code: i32,
        stderr: String,
    },
    ArtifactCollected {
        job: String,
        path: PathBuf,
    },
    StageCompleted {
        stage: String,
    },
    StageFailed {
        stage: String,
        failed_jobs: Vec<String>,
    },
    PipelineCompleted {
        run_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Main pipeline execution engine
pub struct ExecutionEngine<R> {
    executor: Arc<JobExecutor<R>>,
    strategy: SchedulingStrategy,
    event_handlers: Arc<Mutex<Vec<EventHandler>>>,
}

impl<R: CommandRunner + 'static> ExecutionEngine<R> {
    pub fn new(runner: R, strategy: SchedulingStrategy) -> Self {
        Self {
            executor: Arc::new(JobExecutor::new(runner)),
            strategy,
            event_handlers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add an event handler
    pub async fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.lock().await.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    async fn emit_event(&self, event: ExecutionEvent) {
        let handlers = self.event_handlers.lock().await;
        for handler in handlers.iter() {
            handler(event.clone());
        }
    }

    /// Execute the entire pipeline for the given trigger context
    pub async fn execute(
        &self,
        pipeline: &mut Pipeline,
        context: &TriggerContext,
    ) -> PipelineReport {
        let run_id = pipeline.state.run_id;

        info!(
            "Starting pipeline run: {} ({}) for ref '{}'",
            pipeline.name, run_id, context.git_ref
        );
        self.emit_event(ExecutionEvent::PipelineStarted {
            run_id,
            pipeline_name: pipeline.name.clone(),
            git_ref: context.git_ref.clone(),
        })
        .await;

        pipeline.state.start(pipeline.jobs.len());

        let mut commands: Vec<CommandRecord> = Vec::new();
        let mut artifacts: Vec<ArtifactRecord> = Vec::new();
        let mut failed_stage: Option<String> = None;

        let stages = pipeline.stages.clone();
        for stage in &stages {
            let plan = plan_stage(pipeline, stage, context);

            for skipped in &plan.skipped {
                if let Some(job) = pipeline.job_mut(&skipped.name) {
                    job.state = JobState::Skipped {
                        reason: skipped.reason.clone(),
                    };
                }
                info!("Job {} skipped: {}", skipped.name, skipped.reason);
                self.emit_event(ExecutionEvent::JobSkipped {
                    job: skipped.name.clone(),
                    reason: skipped.reason.clone(),
                })
                .await;
            }

            self.emit_event(ExecutionEvent::StageStarted {
                stage: stage.clone(),
                eligible: plan.run.len(),
            })
            .await;

            // All jobs skipped counts as vacuous success for the stage
            if plan.is_empty() {
                self.emit_event(ExecutionEvent::StageCompleted {
                    stage: stage.clone(),
                })
                .await;
                continue;
            }

            let outcomes = self.run_stage_jobs(pipeline, context, &plan.run).await;

            let mut failed_jobs = Vec::new();
            for (job_name, outcome) in outcomes {
                self.settle_job(pipeline, &job_name, &outcome).await;
                commands.extend(outcome.records);
                artifacts.extend(outcome.artifacts);
                if matches!(outcome.result, JobResult::Failed { .. }) {
                    failed_jobs.push(job_name);
                }
            }

            if !failed_jobs.is_empty() {
                warn!(
                    "Stage '{}' failed ({} job(s)); halting pipeline",
                    stage,
                    failed_jobs.len()
                );
                pipeline.state.fail();
                failed_stage = Some(stage.clone());
                self.emit_event(ExecutionEvent::StageFailed {
                    stage: stage.clone(),
                    failed_jobs,
                })
                .await;
                break;
            }

            self.emit_event(ExecutionEvent::StageCompleted {
                stage: stage.clone(),
            })
            .await;
        }

        if failed_stage.is_none() {
            pipeline.state.complete();
        }
        pipeline.refresh_counts();

        let status = pipeline.state.status;
        info!("Pipeline run finished: {} - {:?}", pipeline.name, status);
        self.emit_event(ExecutionEvent::PipelineCompleted { run_id, status })
            .await;

        create_report(pipeline, context, failed_stage, commands, artifacts)
    }

    /// Run the eligible jobs of one stage under the scheduling strategy
    ///
    /// Every spawned job runs to a terminal state before this returns, so
    /// the stage barrier holds even when a sibling fails mid-stage.
    async fn run_stage_jobs(
        &self,
        pipeline: &mut Pipeline,
        context: &TriggerContext,
        job_names: &[String],
    ) -> Vec<(String, JobOutcome)> {
        let mut queue: VecDeque<(String, Job, HashMap<String, String>)> = VecDeque::new();

        for name in job_names {
            let job = match pipeline.job(name) {
                Some(j) => j,
                None => continue,
            };
            let env = context.job_environment(pipeline, job);
            queue.push_back((name.clone(), job.clone(), env));
        }

        let limit = self.strategy.max_concurrent();
        let mut join_set: JoinSet<(String, JobOutcome)> = JoinSet::new();
        let mut outcomes = Vec::with_capacity(queue.len());

        loop {
            while join_set.len() < limit {
                match queue.pop_front() {
                    Some((name, job, env)) => {
                        // A job is Running from the moment it is dispatched,
                        // not when the stage is planned, so started_at stays
                        // honest under bounded concurrency.
                        if let Some(queued) = pipeline.job_mut(&name) {
                            queued.state = JobState::Running {
                                started_at: Utc::now(),
                            };
                        }
                        self.emit_event(ExecutionEvent::JobStarted {
                            job: name.clone(),
                            stage: job.stage.clone(),
                        })
                        .await;

                        let executor = self.executor.clone();
                        join_set.spawn(async move {
                            let outcome = executor.execute(&job, &env).await;
                            (name, outcome)
                        });
                    }
                    None => break,
                }
            }

            match join_set.join_next().await {
                Some(Ok(result)) => outcomes.push(result),
                Some(Err(e)) => {
                    // A panicked job task cannot be attributed to a name;
                    // surface it loudly and let the stage settle what ran.
                    error!("Job task panicked: {}", e);
                }
                None => break,
            }
        }

        outcomes
    }

    /// Move a finished job into its terminal state and emit events
    async fn settle_job(&self, pipeline: &mut Pipeline, job_name: &str, outcome: &JobOutcome) {
        let started_at = match pipeline.job(job_name).map(|j| &j.state) {
            Some(JobState::Running { started_at }) => *started_at,
            _ => Utc::now(),
        };

        match &outcome.result {
            JobResult::Succeeded => {
                if let Some(job) = pipeline.job_mut(job_name) {
                    job.state = JobState::Succeeded {
                        started_at,
                        finished_at: Utc::now(),
                    };
                }
                self.emit_event(ExecutionEvent::JobSucceeded {
                    job: job_name.to_string(),
                })
                .await;

                for artifact in &outcome.artifacts {
                    if artifact.collected {
                        self.emit_event(ExecutionEvent::ArtifactCollected {
                            job: job_name.to_string(),
                            path: artifact.path.clone(),
                        })
                        .await;
                    }
                }
            }
            JobResult::Failed {
                command,
                exit_code,
                stderr,
                ..
            } => {
                if let Some(job) = pipeline.job_mut(job_name) {
                    job.state = JobState::Failed {
                        command: command.clone(),
                        exit_code: *exit_code,
                        started_at,
                        failed_at: Utc::now(),
                    };
                }
                self.emit_event(ExecutionEvent::JobFailed {
                    job: job_name.to_string(),
                    command: command.clone(),
                    exit_code: *exit_code,
                    stderr: stderr.clone(),
                })
                .await;
            }
        }
    }
}
