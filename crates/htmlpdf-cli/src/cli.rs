use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use htmlpdf_render::{Param, PdfJob, SourceType, WrapperConfig, XvfbConfig};

const INLINE_PREFIX: &str = "html:";

/// Command-line arguments for the htmlpdf binary.
#[derive(Debug, Parser)]
#[command(name = "htmlpdf", version, about = "Render HTML to PDF with wkhtmltopdf")]
pub struct CliArgs {
    /// JSON wrapper config (renderer command, xvfb, toc ordering).
    #[arg(long, env = "HTMLPDF_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Renderer binary, overriding config and discovery.
    #[arg(long, value_name = "CMD")]
    pub renderer: Option<String>,

    /// Run the renderer under xvfb-run.
    #[arg(long)]
    pub xvfb: bool,

    /// Place tables of contents before all other objects.
    #[arg(long)]
    pub toc_first: bool,

    /// Cover source. Prefix with `html:` for inline markup.
    #[arg(long, value_name = "SOURCE", value_parser = parse_source)]
    pub cover: Option<Source>,

    /// Add a table of contents after the cover.
    #[arg(long)]
    pub toc: bool,

    /// Page source, repeatable. Prefix with `html:` for inline markup.
    #[arg(long = "page", value_name = "SOURCE", value_parser = parse_source)]
    pub pages: Vec<Source>,

    /// Global renderer option as NAME or NAME=VALUE, repeatable.
    #[arg(long = "param", value_name = "NAME[=VALUE]", value_parser = parse_param)]
    pub params: Vec<Param>,

    /// Seconds to wait for the renderer.
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub timeout: u64,

    /// Accept exit code 1 (some assets failed to load).
    #[arg(long)]
    pub allow_missing_assets: bool,

    /// Directory for staged inline markup.
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Write the PDF here instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Let the renderer write `--output` itself.
    #[arg(long, requires = "output")]
    pub direct: bool,

    /// Delete leftover staged files from the temp directory and exit.
    #[arg(long)]
    pub clean_temp: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub location: String,
    pub source_type: SourceType,
}

pub fn parse_source(raw: &str) -> Result<Source, String> {
    if raw.is_empty() {
        return Err("source must not be empty".to_string());
    }
    let (location, source_type) = if let Some(markup) = raw.strip_prefix(INLINE_PREFIX) {
        (markup, SourceType::InlineMarkup)
    } else if raw.starts_with("http://") || raw.starts_with("https://") {
        (raw, SourceType::Url)
    } else {
        (raw, SourceType::File)
    };
    Ok(Source {
        location: location.to_string(),
        source_type,
    })
}

pub fn parse_param(raw: &str) -> Result<Param, String> {
    let raw = raw.trim_start_matches("--");
    match raw.split_once('=') {
        Some(("", _)) => Err("parameter name must not be empty".to_string()),
        Some((name, value)) => Ok(Param::with_value(name, value)),
        None if raw.is_empty() => Err("parameter name must not be empty".to_string()),
        None => Ok(Param::new(raw)),
    }
}

impl CliArgs {
    pub fn wrapper_config(&self) -> eyre::Result<WrapperConfig> {
        let mut config = match &self.config {
            Some(path) => WrapperConfig::load(path)?,
            // Skip discovery when the renderer is given explicitly.
            None if self.renderer.is_some() => WrapperConfig::with_command(Vec::<String>::new()),
            None => WrapperConfig::default(),
        };
        if let Some(renderer) = &self.renderer {
            config.command = vec![renderer.clone()];
        }
        if self.xvfb && config.xvfb.is_none() {
            let mut xvfb = XvfbConfig::default();
            xvfb.params.add(Param::new("auto-servernum"));
            config.xvfb = Some(xvfb);
        }
        if self.toc_first {
            config.always_put_toc_first = true;
        }
        Ok(config)
    }

    /// Job with objects in render order: cover, toc, pages.
    pub fn build_job(&self) -> eyre::Result<PdfJob> {
        let mut job = PdfJob::new(self.wrapper_config()?);
        job.set_timeout(Duration::from_secs(self.timeout))?;
        if self.allow_missing_assets {
            job.set_allow_missing_assets();
        }
        if let Some(dir) = &self.temp_dir {
            job.set_temp_directory(dir);
        }
        job.add_params(self.params.iter().cloned());

        if let Some(cover) = &self.cover {
            job.add_cover(cover.location.clone(), cover.source_type);
        }
        if self.toc {
            job.add_toc();
        }
        for page in &self.pages {
            job.add_page(page.location.clone(), page.source_type);
        }
        Ok(job)
    }
}
