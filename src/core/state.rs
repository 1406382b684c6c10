//! Execution state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Pipeline has not started
    Pending,
    /// Pipeline is currently running
    Running,
    /// Pipeline completed successfully
    Succeeded,
    /// Pipeline failed
    Failed,
}

/// State of a single job
///
/// A job moves `Pending → Skipped` when its run condition is not met,
/// or `Pending → Running → Succeeded | Failed` otherwise. There is no
/// retry arc; the first failing command is final.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JobState {
    /// Job is waiting for its stage to start
    Pending,
    /// Job is currently running
    Running {
        started_at: DateTime<Utc>,
    },
    /// Every setup and script command exited zero
    Succeeded {
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    },
    /// A command exited non-zero; the rest of the job did not run
    Failed {
        command: String,
        exit_code: i32,
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
    },
    /// Run condition not met; no commands executed, no artifacts produced
    Skipped {
        reason: String,
    },
}

impl JobState {
    /// Check if the job is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded { .. } | JobState::Failed { .. } | JobState::Skipped { .. }
        )
    }
}

/// Overall pipeline state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// Unique run ID
    pub run_id: Uuid,

    /// Current execution status
    pub status: ExecutionStatus,

    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// When the run completed/failed
    pub finished_at: Option<DateTime<Utc>>,

    /// Total number of jobs
    pub total_jobs: usize,

    /// Number of succeeded jobs
    pub succeeded_jobs: usize,

    /// Number of failed jobs
    pub failed_jobs: usize,

    /// Number of skipped jobs
    pub skipped_jobs: usize,
}

impl PipelineState {
    /// Create a new pipeline state
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            started_at: None,
            finished_at: None,
            total_jobs: 0,
            succeeded_jobs: 0,
            failed_jobs: 0,
            skipped_jobs: 0,
        }
    }

    /// Mark the run as started
    pub fn start(&mut self, total_jobs: usize) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
        self.total_jobs = total_jobs;
    }

    /// Mark the run as completed successfully
    pub fn complete(&mut self) {
        self.status = ExecutionStatus::Succeeded;
        self.finished_at = Some(Utc::now());
    }

    /// Mark the run as failed
    pub fn fail(&mut self) {
        self.status = ExecutionStatus::Failed;
        self.finished_at = Some(Utc::now());
    }

    /// Update job counts
    pub fn update_counts(&mut self, succeeded: usize, failed: usize, skipped: usize) {
        self.succeeded_jobs = succeeded;
        self.failed_jobs = failed;
        self.skipped_jobs = skipped;
    }

    /// Calculate progress percentage (0.0 to 1.0)
    ///
    /// Skipped jobs count as settled; they never run.
    pub fn progress(&self) -> f64 {
        if self.total_jobs == 0 {
            return 0.0;
        }
        (self.succeeded_jobs + self.failed_jobs + self.skipped_jobs) as f64
            / self.total_jobs as f64
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_state_is_terminal() {
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Running {
            started_at: Utc::now()
        }
        .is_terminal());
        assert!(JobState::Succeeded {
            started_at: Utc::now(),
            finished_at: Utc::now()
        }
        .is_terminal());
        assert!(JobState::Failed {
            command: "cargo test".to_string(),
            exit_code: 101,
            started_at: Utc::now(),
            failed_at: Utc::now()
        }
        .is_terminal());
        assert!(JobState::Skipped {
            reason: "ref mismatch".to_string()
        }
        .is_terminal());
    }

    #[test]
    fn test_pipeline_progress() {
        let mut state = PipelineState::new();
        state.start(4);
        assert_eq!(state.progress(), 0.0);

        state.update_counts(2, 0, 0);
        assert_eq!(state.progress(), 0.5);

        state.update_counts(3, 0, 1);
        assert_eq!(state.progress(), 1.0);
    }
}
