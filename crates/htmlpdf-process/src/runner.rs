use std::io;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::error::ProcessError;
use crate::exit_codes::AcceptableExitCodes;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

type DrainHandle = JoinHandle<io::Result<Vec<u8>>>;

/// Runs one external command to completion under a timeout.
///
/// stdout and stderr are each drained by their own task while the process
/// runs. Reading them one after the other can deadlock once the child fills
/// whichever pipe nobody is reading.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
    acceptable: AcceptableExitCodes,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, AcceptableExitCodes::default())
    }
}

impl ProcessRunner {
    pub fn new(timeout: Duration, acceptable: AcceptableExitCodes) -> Self {
        Self {
            timeout,
            acceptable,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn acceptable_exit_codes(&self) -> &AcceptableExitCodes {
        &self.acceptable
    }

    /// Execute `argv` and return everything the process wrote to stdout.
    ///
    /// The first element is the program, the rest are its arguments. On
    /// timeout the child is killed and reaped before returning, and any
    /// partial output is dropped.
    pub async fn execute(&self, argv: &[String]) -> Result<Vec<u8>, ProcessError> {
        let (program, args) = argv.split_first().ok_or(ProcessError::EmptyCommand)?;
        let command = argv.join(" ");
        let started_at = Instant::now();

        debug!(command, timeout_ms = millis(self.timeout), "spawning renderer");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                error!(command, error = %source, "failed to spawn renderer");
                ProcessError::Spawn {
                    command: command.clone(),
                    source,
                }
            })?;

        let mut stdout_task = spawn_drain(child.stdout.take());
        let mut stderr_task = spawn_drain(child.stderr.take());

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(source)) => {
                stdout_task.abort();
                stderr_task.abort();
                return Err(ProcessError::Wait { command, source });
            }
            Err(_elapsed) => {
                if let Err(e) = child.kill().await {
                    warn!(command, error = %e, "failed to kill timed out renderer");
                }
                stdout_task.abort();
                stderr_task.abort();
                error!(
                    command,
                    timeout_ms = millis(self.timeout),
                    "renderer timed out"
                );
                return Err(ProcessError::Timeout {
                    command,
                    timeout: self.timeout,
                });
            }
        };

        // The process is gone, but a grandchild may still hold the pipes open.
        let drained = tokio::time::timeout(self.timeout, async {
            tokio::join!(&mut stdout_task, &mut stderr_task)
        })
        .await;
        let (stdout, stderr) = match drained {
            Ok((out, err)) => (
                collect_drain(out, &command)?,
                collect_drain(err, &command)?,
            ),
            Err(_elapsed) => {
                stdout_task.abort();
                stderr_task.abort();
                error!(command, "renderer output did not close in time");
                return Err(ProcessError::DrainTimeout { command });
            }
        };

        let elapsed_ms = millis(started_at.elapsed());
        match status.code() {
            Some(code) if self.acceptable.contains(code) => {
                debug!(
                    command,
                    stderr = %String::from_utf8_lossy(&stderr),
                    "renderer diagnostics"
                );
                info!(
                    command,
                    exit_code = code,
                    elapsed_ms,
                    stdout_bytes = stdout.len(),
                    "renderer finished"
                );
                Ok(stdout)
            }
            exit_code => {
                error!(
                    command,
                    exit_code = ?exit_code,
                    elapsed_ms,
                    stderr = %String::from_utf8_lossy(&stderr),
                    "renderer failed"
                );
                Err(ProcessError::Failed {
                    command,
                    exit_code,
                    stderr,
                    stdout,
                })
            }
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn spawn_drain<R>(stream: Option<R>) -> DrainHandle
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            stream.read_to_end(&mut buf).await?;
        }
        Ok(buf)
    })
}

fn collect_drain(
    joined: Result<io::Result<Vec<u8>>, JoinError>,
    command: &str,
) -> Result<Vec<u8>, ProcessError> {
    match joined {
        Ok(Ok(buf)) => Ok(buf),
        Ok(Err(source)) => Err(ProcessError::Drain {
            command: command.to_string(),
            source,
        }),
        Err(e) => Err(ProcessError::Drain {
            command: command.to_string(),
            source: io::Error::other(e),
        }),
    }
}
