use std::path::PathBuf;

use htmlpdf_core::CoreError;
use htmlpdf_process::ProcessError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to stage inline markup in {dir}: {source}")]
    Staging {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Object(#[from] CoreError),

    #[error("failed to save PDF to {path}: {source}")]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to sweep temp files in {dir}: {source}")]
    Sweep {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("timeout must be greater than zero")]
    InvalidTimeout,
}
