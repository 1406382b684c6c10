//! Test utilities shared across integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use stagehand::execution::{CommandOutput, CommandRunner, RunnerError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Mock runner with scripted failures and a shared execution log
pub struct MockRunner {
    /// Commands containing any of these substrings exit non-zero
    fail_markers: Vec<String>,

    /// Artificial per-command latency, to surface ordering bugs
    simulate_delay: Option<Duration>,

    /// Every command attempted, in execution order
    pub log: Arc<Mutex<Vec<String>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            fail_markers: Vec::new(),
            simulate_delay: None,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_on(mut self, markers: &[&str]) -> Self {
        self.fail_markers = markers.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.simulate_delay = Some(delay);
        self
    }

    /// Handle onto the shared log, valid after the runner moves into the engine
    pub fn log_handle(&self) -> Arc<Mutex<Vec<String>>> {
        self.log.clone()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(
        &self,
        command: &str,
        _env: &HashMap<String, String>,
        _timeout_secs: u64,
    ) -> Result<CommandOutput, RunnerError> {
        if let Some(delay) = self.simulate_delay {
            tokio::time::sleep(delay).await;
        }

        self.log.lock().await.push(command.to_string());

        let failed = self.fail_markers.iter().any(|m| command.contains(m));
        Ok(CommandOutput {
            exit_code: if failed { 1 } else { 0 },
            stdout: String::new(),
            stderr: if failed {
                "scripted failure".to_string()
            } else {
                String::new()
            },
        })
    }
}

/// The docs pipeline the sample descriptor encodes: a test stage with three
/// toolchain jobs and a deploy stage gated to master.
pub const DOCS_PIPELINE_YAML: &str = r#"
name: docs
stages:
  - test
  - deploy_docs

jobs:
  - name: "test:stable"
    stage: test
    before_script:
      - rustup default stable
    script:
      - cargo build stable
      - cargo test stable

  - name: "test:beta"
    stage: test
    before_script:
      - rustup default beta
    script:
      - cargo build beta
      - cargo test beta

  - name: "test:nightly"
    stage: test
    before_script:
      - rustup default nightly
    script:
      - cargo build nightly
      - cargo test nightly

  - name: pages
    stage: deploy_docs
    only:
      - master
    script:
      - cargo doc
      - mv target/doc public
    artifacts:
      paths:
        - public
"#;
