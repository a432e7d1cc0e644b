//! Staging of inline markup to temp files.
//!
//! wkhtmltopdf only reads pages from URLs or paths, so inline HTML is written
//! to a uniquely named file first. Every staged file carries
//! [`TEMP_FILE_PREFIX`] so that [`sweep_orphans`] can find leftovers later.

use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};

use htmlpdf_core::DocumentObject;
use tempfile::TempPath;
use tracing::{debug, warn};

use crate::error::RenderError;

pub const TEMP_FILE_PREFIX: &str = "htmlpdf-wrapper";
const TEMP_FILE_SUFFIX: &str = ".html";

/// Temp files staged for a single render.
///
/// Files are removed by [`TempResources::cleanup`], or on drop if cleanup
/// never ran.
#[derive(Debug)]
pub struct TempResources {
    dir: PathBuf,
    staged: Vec<TempPath>,
}

impl TempResources {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            staged: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn staged_paths(&self) -> impl Iterator<Item = &Path> {
        self.staged.iter().map(|p| &**p)
    }

    /// Stage `object` if it carries inline markup.
    ///
    /// Objects with URL or file sources, and tables of contents, are returned
    /// as-is. Inline markup comes back as a copy pointing at the staged file.
    pub fn materialize<'a>(
        &mut self,
        object: &'a DocumentObject,
    ) -> Result<Cow<'a, DocumentObject>, RenderError> {
        let Some(markup) = object
            .sourced()
            .filter(|_| object.needs_staging())
            .map(|o| o.source())
        else {
            return Ok(Cow::Borrowed(object));
        };

        let staging_err = |source| RenderError::Staging {
            dir: self.dir.clone(),
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(TEMP_FILE_SUFFIX)
            .tempfile_in(&self.dir)
            .map_err(staging_err)?;
        file.write_all(markup.as_bytes()).map_err(staging_err)?;
        file.flush().map_err(staging_err)?;

        let path = file.into_temp_path();
        debug!(
            path = %path.display(),
            kind = %object.kind(),
            bytes = markup.len(),
            "staged inline markup"
        );
        let staged = object.with_resolved_path(path.to_path_buf());
        self.staged.push(path);
        Ok(Cow::Owned(staged))
    }

    /// Delete every staged file. Failures are logged, never returned.
    pub fn cleanup(&mut self) {
        if self.staged.is_empty() {
            return;
        }
        debug!(count = self.staged.len(), "cleaning up staged files");
        for path in self.staged.drain(..) {
            let path_str = path.display().to_string();
            match path.close() {
                Ok(()) => debug!(path = %path_str, "deleted staged file"),
                Err(e) => warn!(path = %path_str, error = %e, "couldn't delete staged file"),
            }
        }
    }
}

impl Drop for TempResources {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Delete every file in `dir` whose name starts with [`TEMP_FILE_PREFIX`].
///
/// Matches by name only, so files staged by a render that is still running
/// in the same directory are removed too. Returns the number deleted.
pub fn sweep_orphans(dir: &Path) -> Result<usize, RenderError> {
    let sweep_err = |source| RenderError::Sweep {
        dir: dir.to_path_buf(),
        source,
    };

    debug!(dir = %dir.display(), "sweeping orphaned temp files");
    let mut removed = 0;
    for entry in std::fs::read_dir(dir).map_err(sweep_err)? {
        let entry = entry.map_err(sweep_err)?;
        let tagged = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(TEMP_FILE_PREFIX));
        if !tagged || !entry.file_type().map_err(sweep_err)?.is_file() {
            continue;
        }

        let path = entry.path();
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "couldn't delete temp file"),
        }
    }

    debug!(dir = %dir.display(), removed, "temp files removed");
    Ok(removed)
}
