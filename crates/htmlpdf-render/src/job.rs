use std::path::{Path, PathBuf};
use std::time::Duration;

use htmlpdf_core::{DocumentObject, ObjectKind, Param, ParameterSet, SourceType, WrapperConfig};
use htmlpdf_process::runner::DEFAULT_TIMEOUT;
use htmlpdf_process::{AcceptableExitCodes, ProcessRunner};
use tracing::{debug, info};

use crate::command::CommandBuilder;
use crate::error::RenderError;
use crate::staging::{TempResources, sweep_orphans};

/// A PDF to be produced by one wkhtmltopdf run.
///
/// Collect objects and global parameters, then call one of the render entry
/// points. Inline markup is staged for the duration of each render and
/// removed afterwards, whether or not the render succeeded.
#[derive(Debug, Clone)]
pub struct PdfJob {
    config: WrapperConfig,
    params: ParameterSet,
    objects: Vec<DocumentObject>,
    timeout: Duration,
    success_codes: AcceptableExitCodes,
    temp_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
}

impl PdfJob {
    pub fn new(config: WrapperConfig) -> Self {
        info!(command = ?config.command, xvfb = config.is_xvfb_enabled(), "pdf job initialized");
        Self {
            config,
            params: ParameterSet::new(),
            objects: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            success_codes: AcceptableExitCodes::default(),
            temp_dir: None,
            output_path: None,
        }
    }

    pub fn config(&self) -> &WrapperConfig {
        &self.config
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Objects in the order they were added.
    pub fn objects(&self) -> &[DocumentObject] {
        &self.objects
    }

    /// Append an object and hand it back for per-object params.
    pub fn push_object(&mut self, object: DocumentObject) -> &mut DocumentObject {
        let index = self.objects.len();
        self.objects.push(object);
        &mut self.objects[index]
    }

    /// Append an object by kind. The source is ignored for a table of contents.
    pub fn add_object(
        &mut self,
        kind: ObjectKind,
        source: impl Into<String>,
        source_type: SourceType,
    ) -> &mut DocumentObject {
        self.push_object(DocumentObject::new(kind, source, source_type))
    }

    pub fn add_page(
        &mut self,
        source: impl Into<String>,
        source_type: SourceType,
    ) -> &mut DocumentObject {
        self.push_object(DocumentObject::page(source, source_type))
    }

    pub fn add_page_from_url(&mut self, url: impl Into<String>) -> &mut DocumentObject {
        self.add_page(url, SourceType::Url)
    }

    pub fn add_page_from_file(&mut self, path: impl Into<String>) -> &mut DocumentObject {
        self.add_page(path, SourceType::File)
    }

    pub fn add_page_from_string(&mut self, html: impl Into<String>) -> &mut DocumentObject {
        self.add_page(html, SourceType::InlineMarkup)
    }

    pub fn add_cover(
        &mut self,
        source: impl Into<String>,
        source_type: SourceType,
    ) -> &mut DocumentObject {
        self.push_object(DocumentObject::cover(source, source_type))
    }

    pub fn add_cover_from_url(&mut self, url: impl Into<String>) -> &mut DocumentObject {
        self.add_cover(url, SourceType::Url)
    }

    pub fn add_cover_from_file(&mut self, path: impl Into<String>) -> &mut DocumentObject {
        self.add_cover(path, SourceType::File)
    }

    pub fn add_cover_from_string(&mut self, html: impl Into<String>) -> &mut DocumentObject {
        self.add_cover(html, SourceType::InlineMarkup)
    }

    pub fn add_toc(&mut self) -> &mut DocumentObject {
        self.push_object(DocumentObject::toc())
    }

    pub fn add_param(&mut self, param: Param) -> &mut Self {
        self.params.add(param);
        self
    }

    pub fn add_params(&mut self, params: impl IntoIterator<Item = Param>) -> &mut Self {
        self.params.add_all(params);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> Result<(), RenderError> {
        if timeout.is_zero() {
            return Err(RenderError::InvalidTimeout);
        }
        self.timeout = timeout;
        Ok(())
    }

    /// wkhtmltopdf exits 1 when some assets couldn't be loaded; accept that.
    pub fn set_allow_missing_assets(&mut self) {
        self.success_codes.allow_missing_assets();
    }

    pub fn allow_missing_assets(&self) -> bool {
        self.success_codes.allows_missing_assets()
    }

    /// Replace the accepted exit codes. 0 is always kept.
    pub fn set_success_codes(&mut self, codes: impl IntoIterator<Item = i32>) {
        self.success_codes = AcceptableExitCodes::new(codes);
    }

    pub fn success_codes(&self) -> &AcceptableExitCodes {
        &self.success_codes
    }

    pub fn set_temp_directory(&mut self, dir: impl Into<PathBuf>) {
        self.temp_dir = Some(dir.into());
    }

    pub fn temp_directory(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }

    /// Where staged files go: the override if set, else the OS temp dir.
    pub fn effective_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Have wkhtmltopdf write straight to `path` instead of stdout.
    pub fn set_output_path(&mut self, path: impl Into<PathBuf>) {
        self.output_path = Some(path.into());
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// The argument vector a render would run.
    ///
    /// Inline markup is staged only while the vector is built, so the paths
    /// it names no longer exist once this returns.
    pub fn command_args(&self) -> Result<Vec<String>, RenderError> {
        let mut staging = TempResources::new(self.effective_temp_dir());
        CommandBuilder::new(&self.config).build(self, &mut staging)
    }

    /// [`Self::command_args`] joined with spaces, for logs and diagnostics.
    pub fn command(&self) -> Result<String, RenderError> {
        Ok(self.command_args()?.join(" "))
    }

    /// Run the renderer and return the PDF bytes it wrote to stdout.
    pub async fn render(&self) -> Result<Vec<u8>, RenderError> {
        let mut staging = TempResources::new(self.effective_temp_dir());
        let result = self.run(&mut staging).await;
        staging.cleanup();
        result
    }

    /// Render to memory, then write the bytes to `path`.
    pub async fn save_as(&self, path: impl AsRef<Path>) -> Result<PathBuf, RenderError> {
        let path = path.as_ref();
        let bytes = self.render().await?;

        let save_err = |source| RenderError::Save {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(save_err)?;
        }
        tokio::fs::write(path, &bytes).await.map_err(save_err)?;

        info!(path = %path.display(), bytes = bytes.len(), "PDF saved");
        Ok(path.to_path_buf())
    }

    /// Have the renderer write directly to `path`, skipping the in-memory copy.
    ///
    /// The output path stays set on the job for later renders.
    pub async fn save_as_direct(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf, RenderError> {
        let path = std::path::absolute(path.as_ref()).map_err(|source| RenderError::Save {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        self.output_path = Some(path.clone());
        self.render().await?;

        info!(path = %path.display(), "PDF written by renderer");
        Ok(path)
    }

    /// Remove every staged file in this job's temp directory, from any job.
    ///
    /// Must not run while a render using the same directory is in flight.
    pub fn clean_all_temp_files(&self) -> Result<usize, RenderError> {
        sweep_orphans(&self.effective_temp_dir())
    }

    async fn run(&self, staging: &mut TempResources) -> Result<Vec<u8>, RenderError> {
        let argv = CommandBuilder::new(&self.config).build(self, staging)?;
        debug!(
            command = %argv.join(" "),
            staged = staging.staged_paths().count(),
            "generating pdf"
        );

        let runner = ProcessRunner::new(self.timeout, self.success_codes.clone());
        Ok(runner.execute(&argv).await?)
    }
}
