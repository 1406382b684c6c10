//! Command runner - the process boundary
//!
//! Each script line executes as a single `sh -c` invocation. The
//! [`CommandRunner`] trait is the seam tests mock out.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Error types for command execution
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command '{command}' timed out after {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },
}

/// Captured result of a single command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Process exit code (-1 when killed by a signal)
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait for command execution - allows for different implementations
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a single command to completion and capture its output
    async fn run(
        &self,
        command: &str,
        env: &HashMap<String, String>,
        timeout_secs: u64,
    ) -> Result<CommandOutput, RunnerError>;
}

/// Runner that executes commands through the system shell
#[derive(Debug, Clone)]
pub struct ShellRunner {
    /// Shell binary used to interpret commands
    shell: String,

    /// Working directory for spawned commands (None = inherit)
    workdir: Option<PathBuf>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
            workdir: None,
        }
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(
        &self,
        command: &str,
        env: &HashMap<String, String>,
        timeout_secs: u64,
    ) -> Result<CommandOutput, RunnerError> {
        debug!("Spawning shell command: {}", command);

        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .envs(env)
            .kill_on_drop(true);

        if let Some(workdir) = &self.workdir {
            cmd.current_dir(workdir);
        }

        let result = timeout(Duration::from_secs(timeout_secs), cmd.output())
            .await
            .map_err(|_| RunnerError::Timeout {
                command: command.to_string(),
                timeout_secs,
            })?;

        let output = result.map_err(|source| RunnerError::Spawn {
            command: command.to_string(),
            source,
        })?;

        let exit_code = output.status.code().unwrap_or(-1);
        debug!("Command '{}' exited with code {}", command, exit_code);

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
