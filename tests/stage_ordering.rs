//! Stage barrier ordering
//!
//! No command of a later stage may run before every job of the earlier
//! stage reaches a terminal state, regardless of scheduling strategy.

mod common;

use common::MockRunner;
use stagehand::core::config::PipelineConfig;
use stagehand::core::{JobState, TriggerContext};
use stagehand::execution::{ExecutionEngine, SchedulingStrategy};
use std::time::Duration;

async fn run_and_collect_log(strategy: SchedulingStrategy) -> Vec<String> {
    let mut pipeline = PipelineConfig::from_yaml(common::DOCS_PIPELINE_YAML)
        .unwrap()
        .to_pipeline();
    let context = TriggerContext::new("master");

    // Delay makes the test-stage jobs genuinely overlap under Parallel
    let runner = MockRunner::new().with_delay(Duration::from_millis(10));
    let log = runner.log_handle();

    let engine = ExecutionEngine::new(runner, strategy);
    let report = engine.execute(&mut pipeline, &context).await;
    assert!(report.succeeded());

    let log = log.lock().await;
    log.clone()
}

fn assert_deploy_after_all_tests(log: &[String]) {
    let first_deploy = log
        .iter()
        .position(|c| c == "cargo doc")
        .expect("deploy stage should have run");

    for (i, command) in log.iter().enumerate() {
        if command.contains("stable") || command.contains("beta") || command.contains("nightly") {
            assert!(
                i < first_deploy,
                "test-stage command '{}' ran after the deploy stage started",
                command
            );
        }
    }
}

#[tokio::test]
async fn test_stage_barrier_parallel() {
    let log = run_and_collect_log(SchedulingStrategy::Parallel).await;
    // 3 jobs x 3 commands + 2 deploy commands
    assert_eq!(log.len(), 11);
    assert_deploy_after_all_tests(&log);
}

#[tokio::test]
async fn test_stage_barrier_sequential() {
    let log = run_and_collect_log(SchedulingStrategy::Sequential).await;
    assert_eq!(log.len(), 11);
    assert_deploy_after_all_tests(&log);

    // Sequential additionally keeps jobs in declared order
    assert_eq!(log[0], "rustup default stable");
    assert_eq!(log[3], "rustup default beta");
    assert_eq!(log[6], "rustup default nightly");
}

#[tokio::test]
async fn test_stage_barrier_limited_parallel() {
    let log = run_and_collect_log(SchedulingStrategy::LimitedParallel(2)).await;
    assert_eq!(log.len(), 11);
    assert_deploy_after_all_tests(&log);
}

#[tokio::test]
async fn test_sequential_start_times_follow_dispatch() {
    let mut pipeline = PipelineConfig::from_yaml(common::DOCS_PIPELINE_YAML)
        .unwrap()
        .to_pipeline();
    let context = TriggerContext::new("feature-x");

    let runner = MockRunner::new().with_delay(Duration::from_millis(10));
    let engine = ExecutionEngine::new(runner, SchedulingStrategy::Sequential);

    let report = engine.execute(&mut pipeline, &context).await;
    assert!(report.succeeded());

    // A job goes Running when it is dispatched, not when its stage is
    // planned, so sequential start times are spaced by the predecessor's
    // run time (3 commands x 10ms) instead of all coinciding.
    let starts: Vec<_> = ["test:stable", "test:beta", "test:nightly"]
        .iter()
        .map(|name| match &pipeline.job(name).unwrap().state {
            JobState::Succeeded { started_at, .. } => *started_at,
            state => panic!("Expected Succeeded for {}, got {:?}", name, state),
        })
        .collect();

    for window in starts.windows(2) {
        let gap = window[1] - window[0];
        assert!(
            gap >= chrono::Duration::milliseconds(25),
            "job started {}ms after its predecessor; expected the predecessor to run first",
            gap.num_milliseconds()
        );
    }
}

#[tokio::test]
async fn test_commands_within_job_stay_ordered() {
    let log = run_and_collect_log(SchedulingStrategy::Parallel).await;

    for toolchain in ["stable", "beta", "nightly"] {
        let setup = log
            .iter()
            .position(|c| *c == format!("rustup default {}", toolchain))
            .unwrap();
        let build = log
            .iter()
            .position(|c| *c == format!("cargo build {}", toolchain))
            .unwrap();
        let test = log
            .iter()
            .position(|c| *c == format!("cargo test {}", toolchain))
            .unwrap();
        assert!(setup < build && build < test);
    }
}
