//! htmlpdf-core
//!
//! Shared vocabulary for driving wkhtmltopdf: parameters, document objects,
//! and wrapper configuration. No process spawning happens here.

pub mod config;
pub mod error;
pub mod object;
pub mod params;

pub use crate::config::{WrapperConfig, XvfbConfig};
pub use crate::error::CoreError;
pub use crate::object::{DocumentObject, ObjectKind, SourceType, SourcedObject, TableOfContents};
pub use crate::params::{Param, ParameterSet};
