//! Failure propagation
//!
//! The first non-zero exit fails its job, the failed job fails its stage,
//! and a failed stage halts the pipeline before the next stage starts.
//! Sibling jobs already running finish naturally.

mod common;

use common::MockRunner;
use stagehand::core::config::PipelineConfig;
use stagehand::core::{JobState, TriggerContext};
use stagehand::execution::{ExecutionEngine, SchedulingStrategy};

#[tokio::test]
async fn test_failed_test_job_halts_deploy_even_on_master() {
    let mut pipeline = PipelineConfig::from_yaml(common::DOCS_PIPELINE_YAML)
        .unwrap()
        .to_pipeline();
    let context = TriggerContext::new("master");

    let runner = MockRunner::new().failing_on(&["cargo test beta"]);
    let log = runner.log_handle();
    let engine = ExecutionEngine::new(runner, SchedulingStrategy::Parallel);

    let report = engine.execute(&mut pipeline, &context).await;

    assert!(!report.succeeded());
    assert_eq!(report.failed_stage.as_deref(), Some("test"));

    // deploy_docs never entered Running regardless of the matching ref
    assert!(matches!(
        pipeline.job("pages").unwrap().state,
        JobState::Pending
    ));
    assert!(!log.lock().await.iter().any(|c| c == "cargo doc"));

    // The failing job carries the offending command and exit code
    match &pipeline.job("test:beta").unwrap().state {
        JobState::Failed {
            command, exit_code, ..
        } => {
            assert_eq!(command, "cargo test beta");
            assert_eq!(*exit_code, 1);
        }
        state => panic!("Expected Failed, got {:?}", state),
    }
}

#[tokio::test]
async fn test_first_failing_command_aborts_the_job() {
    let mut pipeline = PipelineConfig::from_yaml(common::DOCS_PIPELINE_YAML)
        .unwrap()
        .to_pipeline();
    let context = TriggerContext::new("feature-x");

    // Fail the build step of one job; its test step must not run
    let runner = MockRunner::new().failing_on(&["cargo build nightly"]);
    let log = runner.log_handle();
    let engine = ExecutionEngine::new(runner, SchedulingStrategy::Parallel);

    let report = engine.execute(&mut pipeline, &context).await;
    assert!(!report.succeeded());

    let log = log.lock().await;
    assert!(log.iter().any(|c| c == "cargo build nightly"));
    assert!(!log.iter().any(|c| c == "cargo test nightly"));
}

#[tokio::test]
async fn test_siblings_finish_naturally_when_one_fails() {
    let mut pipeline = PipelineConfig::from_yaml(common::DOCS_PIPELINE_YAML)
        .unwrap()
        .to_pipeline();
    let context = TriggerContext::new("feature-x");

    let runner = MockRunner::new().failing_on(&["rustup default beta"]);
    let engine = ExecutionEngine::new(runner, SchedulingStrategy::Parallel);

    let report = engine.execute(&mut pipeline, &context).await;
    assert!(!report.succeeded());

    // The other two jobs in the stage still reached Succeeded
    assert!(matches!(
        pipeline.job("test:stable").unwrap().state,
        JobState::Succeeded { .. }
    ));
    assert!(matches!(
        pipeline.job("test:nightly").unwrap().state,
        JobState::Succeeded { .. }
    ));
    assert!(matches!(
        pipeline.job("test:beta").unwrap().state,
        JobState::Failed { .. }
    ));
}

#[tokio::test]
async fn test_failure_in_setup_fails_stage() {
    let yaml = r#"
stages: [test, deploy]
jobs:
  - name: unit
    stage: test
    before_script: ["prepare"]
    script: ["run"]
  - name: publish
    stage: deploy
    script: ["ship"]
"#;

    let mut pipeline = PipelineConfig::from_yaml(yaml).unwrap().to_pipeline();
    let context = TriggerContext::new("master");

    let runner = MockRunner::new().failing_on(&["prepare"]);
    let log = runner.log_handle();
    let engine = ExecutionEngine::new(runner, SchedulingStrategy::Sequential);

    let report = engine.execute(&mut pipeline, &context).await;
    assert!(!report.succeeded());
    assert_eq!(report.failed_stage.as_deref(), Some("test"));
    assert_eq!(*log.lock().await, vec!["prepare"]);
}
