//! htmlpdf-process
//!
//! Bounded execution of the external renderer: spawn, drain stdout and
//! stderr concurrently, enforce a wall-clock timeout, classify the exit code.

pub mod error;
pub mod exit_codes;
pub mod runner;

pub use crate::error::ProcessError;
pub use crate::exit_codes::AcceptableExitCodes;
pub use crate::runner::ProcessRunner;
