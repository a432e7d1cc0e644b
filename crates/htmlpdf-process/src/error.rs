use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("empty command: nothing to execute")]
    EmptyCommand,

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("failed waiting on `{command}`: {source}")]
    Wait {
        command: String,
        source: std::io::Error,
    },

    #[error("process timed out after {timeout:?}: `{command}`. Try increasing the timeout")]
    Timeout { command: String, timeout: Duration },

    #[error("failed reading output of `{command}`: {source}")]
    Drain {
        command: String,
        source: std::io::Error,
    },

    #[error("output streams of `{command}` did not close after the process exited")]
    DrainTimeout { command: String },

    #[error("process failed (exit {}): `{command}`: {}", exit_code_label(.exit_code), String::from_utf8_lossy(.stderr).trim())]
    Failed {
        command: String,
        /// `None` when the process was terminated by a signal.
        exit_code: Option<i32>,
        stderr: Vec<u8>,
        /// Whatever the process wrote to stdout before exiting.
        stdout: Vec<u8>,
    },
}

impl ProcessError {
    /// The command line that produced this error, if one was run.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::EmptyCommand => None,
            Self::Spawn { command, .. }
            | Self::Wait { command, .. }
            | Self::Timeout { command, .. }
            | Self::Drain { command, .. }
            | Self::DrainTimeout { command }
            | Self::Failed { command, .. } => Some(command),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}
