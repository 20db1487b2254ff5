//! Child process launch, output relay and exit classification

use crate::config::Environment;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Host exit code used when the child did not exit normally or never started
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Configuration for spawning a process
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Process name (for logging)
    pub name: String,
    /// Executable path or name looked up in PATH
    pub executable: String,
    /// Command line arguments
    pub args: Vec<String>,
    /// Complete environment of the child
    pub env: Environment,
}

/// How a started process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Process exited on its own with an exit code
    Exited { code: i32 },
    /// Process was terminated by a signal
    Signaled { signal: i32 },
    /// Process ended without an exit code or signal
    Abnormal,
}

impl ProcessOutcome {
    /// Classify an exit status without assuming an exit code is present
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ProcessOutcome::Exited { code };
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;

            if let Some(signal) = status.signal() {
                return ProcessOutcome::Signaled { signal };
            }
        }

        ProcessOutcome::Abnormal
    }

    /// Check if the process exited with code 0
    pub fn success(&self) -> bool {
        matches!(self, ProcessOutcome::Exited { code: 0 })
    }

    /// Exit code the host process should report
    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessOutcome::Exited { code } => *code,
            ProcessOutcome::Signaled { .. } | ProcessOutcome::Abnormal => FAILURE_EXIT_CODE,
        }
    }
}

impl std::fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessOutcome::Exited { code } => write!(f, "exited with code {}", code),
            ProcessOutcome::Signaled { signal } => write!(f, "terminated by signal {}", signal),
            ProcessOutcome::Abnormal => write!(f, "terminated abnormally"),
        }
    }
}

/// Runs a single child process to completion
pub struct Launcher {
    config: ProcessConfig,
}

impl Launcher {
    /// Create a new launcher
    pub fn new(config: ProcessConfig) -> Self {
        Self { config }
    }

    /// Run the process, relaying its output to our own stdout and stderr
    pub async fn run(&self) -> Result<ProcessOutcome, ProcessError> {
        let (outcome, _, _) = self
            .run_with(tokio::io::stdout(), tokio::io::stderr())
            .await?;
        Ok(outcome)
    }

    /// Run the process, relaying its output to the given writers.
    ///
    /// The writers are handed back once both streams reached end of file.
    pub async fn run_with<O, E>(
        &self,
        stdout: O,
        stderr: E,
    ) -> Result<(ProcessOutcome, O, E), ProcessError>
    where
        O: AsyncWrite + Unpin + Send + 'static,
        E: AsyncWrite + Unpin + Send + 'static,
    {
        log::debug!(
            "[{}] Starting: {} {}",
            self.config.name,
            self.config.executable,
            self.config.args.join(" ")
        );

        let mut cmd = Command::new(&self.config.executable);
        cmd.args(&self.config.args)
            .env_clear()
            .envs(&self.config.env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| ProcessError::SpawnFailed {
            name: self.config.name.clone(),
            source: e,
        })?;

        if let Some(pid) = child.id() {
            log::debug!("[{}] Started with pid {}", self.config.name, pid);
        }

        let stdout_task = spawn_relay(
            self.config.name.clone(),
            "stdout",
            child.stdout.take(),
            stdout,
        );
        let stderr_task = spawn_relay(
            self.config.name.clone(),
            "stderr",
            child.stderr.take(),
            stderr,
        );

        let status = child.wait().await.map_err(|e| ProcessError::Wait {
            name: self.config.name.clone(),
            source: e,
        })?;

        let stdout = stdout_task.await?;
        let stderr = stderr_task.await?;

        let outcome = ProcessOutcome::from_status(status);
        log::debug!("[{}] Process {}", self.config.name, outcome);

        Ok((outcome, stdout, stderr))
    }
}

/// Copy one child stream into `writer` until end of file.
///
/// A stream that was not captured is nothing to relay.
fn spawn_relay<R, W>(
    name: String,
    stream: &'static str,
    reader: Option<R>,
    mut writer: W,
) -> JoinHandle<W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut reader) = reader else {
            log::debug!("[{}] No {} to relay", name, stream);
            return writer;
        };
        match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(bytes) => log::trace!("[{}] Relayed {} bytes of {}", name, bytes, stream),
            Err(e) => log::warn!("[{}] Failed relaying {}: {}", name, stream, e),
        }
        if let Err(e) = writer.flush().await {
            log::warn!("[{}] Failed flushing {}: {}", name, stream, e);
        }
        writer
    })
}

/// Errors that can occur while running a process
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed starting '{name}': {source}")]
    SpawnFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for '{name}': {source}")]
    Wait {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Output relay task failed: {0}")]
    Relay(#[from] tokio::task::JoinError),
}
