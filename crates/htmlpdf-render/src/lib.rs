//! htmlpdf-render
//!
//! Turns a set of document objects into a wkhtmltopdf invocation and runs it.
//!
//! Public API:
//! - `PdfJob` — collect objects and parameters, then `render()`, `save_as()`
//!   or `save_as_direct()`
//! - `CommandBuilder` — argument vector for a job
//! - `TempResources` — staged inline markup, released when the render ends
//! - `sweep_orphans()` — remove staged files left behind by any job

pub mod command;
pub mod error;
pub mod job;
pub mod staging;

pub use crate::command::{CommandBuilder, STDOUT_SENTINEL, render_order};
pub use crate::error::RenderError;
pub use crate::job::PdfJob;
pub use crate::staging::{TEMP_FILE_PREFIX, TempResources, sweep_orphans};

pub use htmlpdf_core::{
    DocumentObject, ObjectKind, Param, ParameterSet, SourceType, WrapperConfig, XvfbConfig,
};
pub use htmlpdf_process::{AcceptableExitCodes, ProcessError};
