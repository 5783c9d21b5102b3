use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

use super::{Evaluation, WorkerRequest, WorkerResponse};

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("evaluation timed out after {0}ms")]
    Timeout(u64),

    #[error("evaluation failed: {0}")]
    Runtime(String),
}

impl SandboxError {
    fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }
}

/// Runs untrusted code in a short-lived worker process. Every call spawns
/// a fresh worker, so no state survives between evaluations and a runaway
/// worker can always be torn down from outside.
#[derive(Debug, Clone)]
pub struct SandboxExecutor {
    program: PathBuf,
    args: Vec<String>,
}

impl SandboxExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments passed to the worker program, for hosts that expose the
    /// worker behind a subcommand of a larger binary.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Executor that re-invokes the current executable as the worker.
    pub fn from_current_exe<I, S>(args: I) -> std::io::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(std::env::current_exe()?).with_args(args))
    }

    /// Evaluate `code` with a hard deadline. The request/response exchange
    /// races the timeout; if the timeout wins, the pending exchange is
    /// dropped and the worker is killed, so exactly one of timeout, error,
    /// or result settles each call. Logs from a timed-out worker are gone
    /// with it.
    pub async fn run(&self, code: &str, timeout: Duration) -> Result<Evaluation, SandboxError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SandboxError::runtime(format!("failed to spawn worker: {e}")))?;
        tracing::debug!(program = %self.program.display(), "spawned sandbox worker");

        let request = WorkerRequest {
            code: code.to_string(),
        };
        match tokio::time::timeout(timeout, exchange(&mut child, &request)).await {
            Err(_) => {
                let timeout_ms = timeout.as_millis() as u64;
                tracing::warn!(timeout_ms, "sandbox evaluation timed out, killing worker");
                let _ = child.kill().await;
                Err(SandboxError::Timeout(timeout_ms))
            }
            Ok(Err(err)) => {
                let _ = child.kill().await;
                Err(err)
            }
            Ok(Ok(response)) => {
                // The exchange is complete; tear the worker down rather
                // than trusting it to exit on its own.
                let _ = child.kill().await;
                match response.error {
                    Some(message) => Err(SandboxError::Runtime(message)),
                    None => Ok(Evaluation {
                        logs: response.logs,
                        result: response.result,
                    }),
                }
            }
        }
    }
}

async fn exchange(
    child: &mut Child,
    request: &WorkerRequest,
) -> Result<WorkerResponse, SandboxError> {
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| SandboxError::runtime("worker stdin unavailable"))?;
    let mut line = serde_json::to_string(request)
        .map_err(|e| SandboxError::runtime(format!("failed to encode request: {e}")))?;
    line.push('\n');
    stdin
        .write_all(line.as_bytes())
        .await
        .map_err(|e| SandboxError::runtime(format!("failed to send request: {e}")))?;
    stdin
        .shutdown()
        .await
        .map_err(|e| SandboxError::runtime(format!("failed to close worker stdin: {e}")))?;
    drop(stdin);

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| SandboxError::runtime("worker stdout unavailable"))?;
    let mut lines = BufReader::new(stdout).lines();
    let reply = lines
        .next_line()
        .await
        .map_err(|e| SandboxError::runtime(format!("failed to read worker response: {e}")))?
        .ok_or_else(|| SandboxError::runtime("worker exited without responding"))?;
    serde_json::from_str(&reply)
        .map_err(|e| SandboxError::runtime(format!("malformed worker response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_carries_the_deadline() {
        assert_eq!(
            SandboxError::Timeout(100).to_string(),
            "evaluation timed out after 100ms"
        );
    }

    #[test]
    fn with_args_builds_worker_command_line() {
        let executor = SandboxExecutor::new("/usr/bin/gofer").with_args(["sandbox-worker"]);
        assert_eq!(executor.args, ["sandbox-worker"]);
    }
}
