#![cfg(unix)]

use std::path::Path;
use std::time::Duration;

use htmlpdf_render::{Param, PdfJob, ProcessError, RenderError, TEMP_FILE_PREFIX, WrapperConfig};
use tempfile::TempDir;

/// A stand-in renderer: `sh -c <script> fake-wkhtmltopdf <args...>`.
fn fake_renderer(script: &str) -> WrapperConfig {
    WrapperConfig::with_command(["sh", "-c", script, "fake-wkhtmltopdf"])
}

/// Prints the content of every staged inline file it is handed.
const ECHO_STAGED: &str = r#"
for a; do
  case "$a" in
    *htmlpdf-wrapper*) cat "$a" ;;
  esac
done
"#;

fn job_in(dir: &Path, script: &str) -> PdfJob {
    let mut job = PdfJob::new(fake_renderer(script));
    job.set_temp_directory(dir);
    job
}

fn staged_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(TEMP_FILE_PREFIX))
        .collect()
}

#[tokio::test]
async fn render_returns_renderer_stdout() {
    let dir = TempDir::new().unwrap();
    let mut job = job_in(dir.path(), r#"printf '%s ' "$@""#);
    job.add_param(Param::new("quiet"));
    job.add_page_from_url("https://example.com");

    let bytes = job.render().await.unwrap();

    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "--quiet page https://example.com - "
    );
}

#[tokio::test]
async fn inline_markup_is_readable_during_render_and_removed_after() {
    let dir = TempDir::new().unwrap();
    let mut job = job_in(dir.path(), ECHO_STAGED);
    job.add_cover_from_string("<h1>Cover</h1>");
    job.add_page_from_string("<p>Body</p>");

    let bytes = job.render().await.unwrap();

    assert_eq!(bytes, b"<h1>Cover</h1><p>Body</p>");
    assert!(staged_files(dir.path()).is_empty());
}

#[tokio::test]
async fn staged_files_are_removed_after_failure() {
    let dir = TempDir::new().unwrap();
    let script = format!("{ECHO_STAGED}\necho 'Exit with code 2' >&2\nexit 2");
    let mut job = job_in(dir.path(), &script);
    job.add_page_from_string("<p>partial</p>");

    let err = job.render().await.unwrap_err();

    match err {
        RenderError::Process(ProcessError::Failed {
            exit_code, stdout, stderr, ..
        }) => {
            assert_eq!(exit_code, Some(2));
            assert_eq!(stdout, b"<p>partial</p>");
            assert!(String::from_utf8_lossy(&stderr).contains("code 2"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(staged_files(dir.path()).is_empty());
}

#[tokio::test]
async fn staged_files_are_removed_after_timeout() {
    let dir = TempDir::new().unwrap();
    let mut job = job_in(dir.path(), "exec sleep 30");
    job.set_timeout(Duration::from_secs(1)).unwrap();
    job.add_page_from_string("<p>slow</p>");

    let err = job.render().await.unwrap_err();

    assert!(matches!(err, RenderError::Process(ref e) if e.is_timeout()), "{err:?}");
    assert!(staged_files(dir.path()).is_empty());
}

#[tokio::test]
async fn missing_assets_exit_code_is_opt_in() {
    let dir = TempDir::new().unwrap();
    let mut job = job_in(dir.path(), "printf pdf; echo 'Warning: Failed to load image' >&2; exit 1");
    job.add_page_from_file("index.html");

    let err = job.render().await.unwrap_err();
    assert!(matches!(
        err,
        RenderError::Process(ProcessError::Failed { exit_code: Some(1), .. })
    ));

    assert!(!job.allow_missing_assets());
    job.set_allow_missing_assets();
    assert!(job.allow_missing_assets());
    assert_eq!(job.render().await.unwrap(), b"pdf");
}

#[tokio::test]
async fn custom_success_codes_keep_zero() {
    let dir = TempDir::new().unwrap();
    let mut job = job_in(dir.path(), "exit 0");
    job.set_success_codes([3]);
    job.add_page_from_file("index.html");

    assert!(job.success_codes().contains(0));
    assert!(job.success_codes().contains(3));
    assert!(job.render().await.unwrap().is_empty());
}

#[tokio::test]
async fn save_as_writes_bytes_creating_parents() {
    let dir = TempDir::new().unwrap();
    let mut job = job_in(dir.path(), "printf '%s' '%PDF-1.4'");
    job.add_page_from_file("index.html");
    let target = dir.path().join("out/nested/report.pdf");

    let saved = job.save_as(&target).await.unwrap();

    assert_eq!(saved, target);
    assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.4");
}

#[tokio::test]
async fn save_as_direct_lets_renderer_write_the_file() {
    let dir = TempDir::new().unwrap();
    let script = r#"for a; do last="$a"; done; printf '%s' '%PDF-direct' > "$last""#;
    let mut job = job_in(dir.path(), script);
    job.add_page_from_string("<p>direct</p>");
    let target = dir.path().join("direct.pdf");

    let saved = job.save_as_direct(&target).await.unwrap();

    assert!(saved.is_absolute());
    assert_eq!(job.output_path(), Some(saved.as_path()));
    assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-direct");
    assert!(staged_files(dir.path()).is_empty());
}

#[tokio::test]
async fn missing_renderer_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut job = PdfJob::new(WrapperConfig::with_command(["/nonexistent/wkhtmltopdf"]));
    job.set_temp_directory(dir.path());
    job.add_page_from_string("<p>x</p>");

    let err = job.render().await.unwrap_err();

    assert!(matches!(err, RenderError::Process(ProcessError::Spawn { .. })));
    assert!(staged_files(dir.path()).is_empty());
}

#[test]
fn zero_timeout_is_rejected() {
    let mut job = PdfJob::new(WrapperConfig::with_command(["wkhtmltopdf"]));

    assert!(matches!(
        job.set_timeout(Duration::ZERO),
        Err(RenderError::InvalidTimeout)
    ));
    assert_eq!(job.timeout(), Duration::from_secs(10));
}

#[test]
fn clean_all_temp_files_sweeps_job_temp_dir() {
    let dir = TempDir::new().unwrap();
    let job = job_in(dir.path(), "true");
    std::fs::write(dir.path().join(format!("{TEMP_FILE_PREFIX}a.html")), "x").unwrap();
    std::fs::write(dir.path().join(format!("{TEMP_FILE_PREFIX}b.html")), "x").unwrap();
    std::fs::write(dir.path().join("keep.txt"), "x").unwrap();

    assert_eq!(job.clean_all_temp_files().unwrap(), 2);
    assert!(dir.path().join("keep.txt").exists());
}
