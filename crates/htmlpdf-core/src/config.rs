use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::params::ParameterSet;

/// Environment variable that overrides renderer discovery.
pub const COMMAND_ENV: &str = "WKHTMLTOPDF_CMD";

const DEFAULT_BINARY: &str = "wkhtmltopdf";
const DEFAULT_XVFB: &str = "xvfb-run";

/// How to invoke the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperConfig {
    /// Renderer binary followed by any binary-level flags.
    #[serde(default = "default_command")]
    pub command: Vec<String>,
    /// Headless display wrapper. `None` runs the renderer directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xvfb: Option<XvfbConfig>,
    /// Move every table of contents ahead of the other objects.
    #[serde(default)]
    pub always_put_toc_first: bool,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            xvfb: None,
            always_put_toc_first: false,
        }
    }
}

impl WrapperConfig {
    /// Use an explicit command array instead of discovering the binary.
    pub fn with_command<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            ..Self::default_without_discovery()
        }
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: WrapperConfig = serde_json::from_str(&contents)?;
        tracing::debug!(path = %path.display(), command = ?config.command, "wrapper config loaded");
        Ok(config)
    }

    pub fn is_xvfb_enabled(&self) -> bool {
        self.xvfb.is_some()
    }

    /// Tokens that precede the object list: xvfb wrapper (if any), then the
    /// renderer command.
    pub fn command_prefix(&self) -> Vec<String> {
        let mut prefix = self
            .xvfb
            .as_ref()
            .map(XvfbConfig::command_line)
            .unwrap_or_default();
        prefix.extend(self.command.iter().cloned());
        prefix
    }

    fn default_without_discovery() -> Self {
        Self {
            command: vec![DEFAULT_BINARY.to_string()],
            xvfb: None,
            always_put_toc_first: false,
        }
    }
}

/// Headless X server wrapper, e.g. `xvfb-run --auto-servernum`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XvfbConfig {
    #[serde(default = "default_xvfb_command")]
    pub command: String,
    #[serde(default)]
    pub params: ParameterSet,
}

impl Default for XvfbConfig {
    fn default() -> Self {
        Self {
            command: default_xvfb_command(),
            params: ParameterSet::new(),
        }
    }
}

impl XvfbConfig {
    pub fn command_line(&self) -> Vec<String> {
        let mut line = vec![self.command.clone()];
        line.extend(self.params.render());
        line
    }
}

fn default_xvfb_command() -> String {
    DEFAULT_XVFB.to_string()
}

fn default_command() -> Vec<String> {
    vec![find_executable()]
}

/// Locate the renderer binary.
///
/// Checks `WKHTMLTOPDF_CMD`, then asks the platform's `which`/`where.exe`.
/// Falls back to the bare binary name and lets `PATH` lookup happen at spawn.
pub fn find_executable() -> String {
    if let Ok(cmd) = std::env::var(COMMAND_ENV) {
        let cmd = cmd.trim();
        if !cmd.is_empty() {
            return cmd.to_string();
        }
    }

    let locator = if cfg!(windows) { "where.exe" } else { "which" };
    let output = Command::new(locator)
        .arg(DEFAULT_BINARY)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(out) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout);
            if let Some(found) = stdout.lines().map(str::trim).find(|l| !l.is_empty()) {
                tracing::debug!(path = found, "wkhtmltopdf located");
                return found.to_string();
            }
            DEFAULT_BINARY.to_string()
        }
        Ok(_) => {
            tracing::debug!("wkhtmltopdf not found on PATH, using bare name");
            DEFAULT_BINARY.to_string()
        }
        Err(e) => {
            tracing::debug!(locator, error = %e, "executable lookup failed, using bare name");
            DEFAULT_BINARY.to_string()
        }
    }
}
