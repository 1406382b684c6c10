//! End-to-end run through the real system shell
//!
//! Exercises process spawning, environment injection, and artifact
//! collection with actual `sh -c` commands.

use stagehand::core::config::PipelineConfig;
use stagehand::core::{JobState, TriggerContext};
use stagehand::execution::{ExecutionEngine, SchedulingStrategy, ShellRunner};
use std::path::PathBuf;

fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stagehand-test-{}-{}", label, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn test_shell_pipeline_produces_artifact() {
    let dir = scratch_dir("artifact");
    let public = dir.join("public");

    let yaml = format!(
        r#"
name: docs
stages: [test, deploy_docs]
jobs:
  - name: unit
    stage: test
    script:
      - "true"
  - name: pages
    stage: deploy_docs
    only: [master]
    script:
      - "mkdir -p {public}"
      - "echo '<html></html>' > {public}/index.html"
    artifacts:
      paths:
        - "{public}"
"#,
        public = public.display()
    );

    let mut pipeline = PipelineConfig::from_yaml(&yaml).unwrap().to_pipeline();
    let context = TriggerContext::new("master");
    let engine = ExecutionEngine::new(ShellRunner::new(), SchedulingStrategy::Sequential);

    let report = engine.execute(&mut pipeline, &context).await;

    assert!(report.succeeded());
    assert!(public.join("index.html").exists());

    let artifact = report
        .artifacts
        .iter()
        .find(|a| a.job == "pages")
        .expect("pages should record its artifact");
    assert!(artifact.collected);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_shell_pipeline_env_injection() {
    let dir = scratch_dir("env");
    let marker = dir.join("ref.txt");

    let yaml = format!(
        r#"
stages: [test]
variables:
  GREETING: hello
jobs:
  - name: record-ref
    stage: test
    script:
      - "printf '%s %s' \"$GREETING\" \"$CI_COMMIT_REF_NAME\" > {marker}"
"#,
        marker = marker.display()
    );

    let mut pipeline = PipelineConfig::from_yaml(&yaml).unwrap().to_pipeline();
    let context = TriggerContext::new("feature-x");
    let engine = ExecutionEngine::new(ShellRunner::new(), SchedulingStrategy::Parallel);

    let report = engine.execute(&mut pipeline, &context).await;
    assert!(report.succeeded());
    assert_eq!(std::fs::read_to_string(&marker).unwrap(), "hello feature-x");

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_shell_pipeline_nonzero_exit_fails_job() {
    let yaml = r#"
stages: [test]
jobs:
  - name: flaky
    stage: test
    script:
      - "true"
      - "exit 7"
      - "true"
"#;

    let mut pipeline = PipelineConfig::from_yaml(yaml).unwrap().to_pipeline();
    let context = TriggerContext::new("master");
    let engine = ExecutionEngine::new(ShellRunner::new(), SchedulingStrategy::Sequential);

    let report = engine.execute(&mut pipeline, &context).await;

    assert!(!report.succeeded());
    match &pipeline.job("flaky").unwrap().state {
        JobState::Failed {
            command, exit_code, ..
        } => {
            assert_eq!(command, "exit 7");
            assert_eq!(*exit_code, 7);
        }
        state => panic!("Expected Failed, got {:?}", state),
    }

    // The command after the failure never ran
    assert_eq!(report.commands.len(), 2);
}
