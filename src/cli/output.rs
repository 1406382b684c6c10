//! CLI output formatting

use crate::{
    core::{ExecutionStatus, JobState},
    execution::{ExecutionEvent, StagePlan},
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "* ");

/// Lines of stderr shown under a failed job before truncation
const STDERR_PREVIEW_LINES: usize = 8;

/// Create a progress bar over the pipeline's jobs
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a job state for display
pub fn format_job_state(state: &JobState) -> String {
    match state {
        JobState::Pending => style("PENDING").dim().to_string(),
        JobState::Running { .. } => style("RUNNING").yellow().to_string(),
        JobState::Succeeded { .. } => style("SUCCEEDED").green().to_string(),
        JobState::Failed { .. } => style("FAILED").red().to_string(),
        JobState::Skipped { .. } => style("SKIPPED").dim().to_string(),
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Succeeded => style("SUCCEEDED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted {
            run_id,
            pipeline_name,
            git_ref,
        } => format!(
            "{} Starting pipeline {} for ref {} ({})",
            ROCKET,
            style(pipeline_name).bold(),
            style(git_ref).cyan(),
            style(&run_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StageStarted { stage, eligible } => format!(
            "{} Stage {} ({} job(s))",
            INFO,
            style(stage).bold(),
            style(eligible).cyan()
        ),
        ExecutionEvent::JobSkipped { job, reason } => {
            format!(
                "{} {} skipped: {}",
                INFO,
                style(job).dim(),
                style(reason).dim()
            )
        }
        ExecutionEvent::JobStarted { job, .. } => {
            format!("{} {}", SPINNER, style(job).cyan())
        }
        ExecutionEvent::JobSucceeded { job } => format!("{} {}", CHECK, style(job).green()),
        ExecutionEvent::JobFailed {
            job,
            command,
            exit_code,
            stderr,
        } => {
            let mut rendered = format!(
                "{} {}: '{}' exited with code {}",
                CROSS,
                style(job).red(),
                command,
                style(exit_code).red()
            );
            if !stderr.trim().is_empty() {
                for line in format_output(stderr.trim_end(), STDERR_PREVIEW_LINES).lines() {
                    rendered.push_str("\n    ");
                    rendered.push_str(line);
                }
            }
            rendered
        }
        ExecutionEvent::ArtifactCollected { job, path } => format!(
            "{} {} artifact: {}",
            PACKAGE,
            style(job).dim(),
            style(path.display()).cyan()
        ),
        ExecutionEvent::StageCompleted { stage } => {
            format!("{} Stage {} completed", CHECK, style(stage).bold())
        }
        ExecutionEvent::StageFailed { stage, failed_jobs } => format!(
            "{} Stage {} failed ({})",
            CROSS,
            style(stage).red(),
            style(failed_jobs.join(", ")).dim()
        ),
        ExecutionEvent::PipelineCompleted { run_id, status } => {
            let status_str = match status {
                ExecutionStatus::Succeeded => {
                    format!("completed {}", style("successfully").green())
                }
                ExecutionStatus::Failed => style("failed").red().to_string(),
                _ => format!("{:?}", status),
            };
            format!(
                "{} Pipeline ({}) {}",
                INFO,
                style(&run_id.to_string()[..8]).dim(),
                status_str
            )
        }
    }
}

/// Format one stage of a dry-run plan
pub fn format_stage_plan(plan: &StagePlan) -> String {
    let mut lines = vec![format!("{} Stage {}", INFO, style(&plan.stage).bold())];

    for job in &plan.run {
        lines.push(format!("    {} {}", CHECK, style(job).green()));
    }
    for skipped in &plan.skipped {
        lines.push(format!(
            "    {} {} ({})",
            CROSS,
            style(&skipped.name).dim(),
            style(&skipped.reason).dim()
        ));
    }

    lines.join("\n")
}

/// Format command output with truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}
