use htmlpdf_core::{DocumentObject, WrapperConfig};
use tracing::debug;

use crate::error::RenderError;
use crate::job::PdfJob;
use crate::staging::TempResources;

/// Output token that tells wkhtmltopdf to write the PDF to stdout.
pub const STDOUT_SENTINEL: &str = "-";

/// Assembles the argument vector for a job.
pub struct CommandBuilder<'a> {
    config: &'a WrapperConfig,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(config: &'a WrapperConfig) -> Self {
        Self { config }
    }

    /// Build the full command for `job`, staging inline markup into `staging`.
    ///
    /// Layout: xvfb prefix, renderer command, global params, one contribution
    /// per object, then the output path or [`STDOUT_SENTINEL`]. A staging
    /// failure aborts the build; files already staged stay owned by
    /// `staging` and are released with it.
    pub fn build(
        &self,
        job: &PdfJob,
        staging: &mut TempResources,
    ) -> Result<Vec<String>, RenderError> {
        let mut argv = self.config.command_prefix();
        argv.extend(job.params().render());

        for object in render_order(job.objects(), self.config.always_put_toc_first) {
            let staged = staging.materialize(object)?;
            argv.extend(staged.contribute()?);
        }

        argv.push(
            job.output_path()
                .map_or_else(|| STDOUT_SENTINEL.to_string(), |p| p.display().to_string()),
        );

        debug!(command = ?argv, "command generated");
        Ok(argv)
    }
}

/// Order in which objects appear on the command line.
///
/// With `toc_first`, tables of contents move ahead of everything else; both
/// groups keep their relative order. The job's own list is never reordered.
pub fn render_order(objects: &[DocumentObject], toc_first: bool) -> Vec<&DocumentObject> {
    if !toc_first {
        return objects.iter().collect();
    }
    let (mut ordered, rest): (Vec<_>, Vec<_>) = objects.iter().partition(|o| o.is_toc());
    ordered.extend(rest);
    ordered
}
