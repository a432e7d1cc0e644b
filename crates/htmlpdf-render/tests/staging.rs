use std::borrow::Cow;

use htmlpdf_render::{DocumentObject, SourceType, TEMP_FILE_PREFIX, TempResources, sweep_orphans};
use tempfile::TempDir;

#[test]
fn non_inline_objects_are_borrowed_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut staging = TempResources::new(dir.path());
    let page = DocumentObject::page("https://example.com", SourceType::Url);
    let toc = DocumentObject::toc();

    assert!(matches!(staging.materialize(&page).unwrap(), Cow::Borrowed(_)));
    assert!(matches!(staging.materialize(&toc).unwrap(), Cow::Borrowed(_)));
    assert_eq!(staging.staged_paths().count(), 0);
}

#[test]
fn staged_file_carries_prefix_and_content() {
    let dir = TempDir::new().unwrap();
    let mut staging = TempResources::new(dir.path());
    let page = DocumentObject::page("<p>hello</p>", SourceType::InlineMarkup);

    let staged = staging.materialize(&page).unwrap().into_owned();
    let path = staged.sourced().unwrap().resolved_path().unwrap().to_path_buf();

    assert_eq!(path.parent().unwrap(), dir.path());
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with(TEMP_FILE_PREFIX), "unexpected name {name}");
    assert!(name.ends_with(".html"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>hello</p>");
}

#[test]
fn each_inline_object_gets_its_own_file() {
    let dir = TempDir::new().unwrap();
    let mut staging = TempResources::new(dir.path());
    let page = DocumentObject::page("<p>same</p>", SourceType::InlineMarkup);

    staging.materialize(&page).unwrap();
    staging.materialize(&page).unwrap();

    let paths: Vec<_> = staging.staged_paths().collect();
    assert_eq!(paths.len(), 2);
    assert_ne!(paths[0], paths[1]);
}

#[test]
fn dropping_resources_removes_files() {
    let dir = TempDir::new().unwrap();
    let path = {
        let mut staging = TempResources::new(dir.path());
        let cover = DocumentObject::cover("<h1>c</h1>", SourceType::InlineMarkup);
        staging.materialize(&cover).unwrap();
        staging.staged_paths().next().unwrap().to_path_buf()
    };

    assert!(!path.exists());
}

#[test]
fn cleanup_tolerates_files_already_gone() {
    let dir = TempDir::new().unwrap();
    let mut staging = TempResources::new(dir.path());
    let page = DocumentObject::page("<p>x</p>", SourceType::InlineMarkup);
    staging.materialize(&page).unwrap();
    let path = staging.staged_paths().next().unwrap().to_path_buf();
    std::fs::remove_file(&path).unwrap();

    staging.cleanup();

    assert_eq!(staging.staged_paths().count(), 0);
}

#[test]
fn sweep_removes_only_tagged_files() {
    let dir = TempDir::new().unwrap();
    for i in 0..3 {
        std::fs::write(dir.path().join(format!("{TEMP_FILE_PREFIX}{i}.html")), "x").unwrap();
    }
    std::fs::write(dir.path().join("report.pdf"), "keep").unwrap();
    std::fs::write(dir.path().join("other-htmlpdf-wrapper.html"), "keep").unwrap();

    let removed = sweep_orphans(dir.path()).unwrap();

    assert_eq!(removed, 3);
    let mut left: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    left.sort();
    assert_eq!(left, vec!["other-htmlpdf-wrapper.html", "report.pdf"]);
}

#[test]
fn sweep_of_missing_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(sweep_orphans(&dir.path().join("gone")).is_err());
}
