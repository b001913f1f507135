// tests/transforms.rs
mod common;
use crate::common::{init_tracing, mem, paths_of, with_timeout, TestResult};

use std::sync::Arc;

use pipebuild::discover;
use pipebuild::errors::BuildError;
use pipebuild::fs::mock::MockFileSystem;
use pipebuild::fs::FileSystem;
use pipebuild::stream::FileStream;
use pipebuild::transform::{remove_path, target_path, RenameTo};
use pipebuild::MatchOptions;

fn shared(fs: &MockFileSystem) -> Arc<dyn FileSystem> {
    Arc::new(fs.clone())
}

fn src(fs: &MockFileSystem, globs: &[&str]) -> FileStream {
    discover::src(shared(fs), globs, &MatchOptions::default()).expect("valid globs")
}

#[tokio::test]
async fn rename_to_a_literal_path_keeps_contents() -> TestResult {
    init_tracing();
    let files = FileStream::new(mem("src/a.js"))
        .rename("bundle.js")
        .into_files()
        .await?;

    assert_eq!(paths_of(&files), ["bundle.js"]);
    let file = files[0].read().await?;
    assert_eq!(file.contents(), "src/a.js");
    Ok(())
}

#[tokio::test]
async fn rename_with_a_function_realizes_disk_files() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("src/a.js", "let a;");
    fs.add_file("src/b.js", "let b;");

    let files = src(&fs, &["src/*.js"])
        .rename(RenameTo::with(|path, _| path.to_uppercase()))
        .into_files()
        .await?;

    assert_eq!(paths_of(&files), ["SRC/A.JS", "SRC/B.JS"]);
    assert!(files.iter().all(|f| f.is_realized()));
    assert_eq!(files[1].read().await?.contents(), "let b;");
    Ok(())
}

#[tokio::test]
async fn rename_to_an_empty_path_fails() {
    let err = FileStream::new(mem("a.txt"))
        .rename(RenameTo::with(|_, _| String::new()))
        .into_files()
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::ConfigError(_)), "got {err:?}");
}

#[tokio::test]
async fn rename_of_a_missing_disk_file_reports_the_path() {
    let fs = MockFileSystem::new();
    let files = FileStream::new(pipebuild::DiskFile::new("gone.txt", shared(&fs)));

    let err = files.rename("x.txt").into_files().await.unwrap_err();
    match err {
        BuildError::Io { path, .. } => assert_eq!(path.to_string_lossy(), "gone.txt"),
        other => panic!("Expected Io error, got: {other:?}"),
    }
}

#[tokio::test]
async fn dest_writes_below_target_directory() -> TestResult {
    let fs = MockFileSystem::new();

    let files = FileStream::new(vec![mem("src/a.js"), mem("b.js")])
        .dest(shared(&fs), Some("dist".to_string()))
        .into_files()
        .await?;

    assert_eq!(paths_of(&files), ["dist/src/a.js", "dist/b.js"]);
    assert!(files.iter().all(|f| !f.is_realized()));
    assert_eq!(fs.contents("dist/src/a.js").as_deref(), Some(&b"src/a.js"[..]));
    assert_eq!(fs.contents("dist/b.js").as_deref(), Some(&b"b.js"[..]));

    // The yielded entities read back what was written.
    assert_eq!(files[0].read().await?.contents(), "src/a.js");
    Ok(())
}

#[tokio::test]
async fn dest_without_directory_writes_in_place() -> TestResult {
    let fs = MockFileSystem::new();

    let files = FileStream::new(mem("out/nested/file.txt"))
        .dest(shared(&fs), None)
        .into_files()
        .await?;

    assert_eq!(paths_of(&files), ["out/nested/file.txt"]);
    assert!(fs.is_dir("out/nested"));
    assert!(fs.exists("out/nested/file.txt"));
    Ok(())
}

#[test]
fn target_paths_join_as_relative() {
    assert_eq!(target_path("dist", "a/b.js"), "dist/a/b.js");
    assert_eq!(target_path("dist/", "/a.js"), "dist/a.js");
    assert_eq!(target_path("./dist", "a.js"), "dist/a.js");
    assert_eq!(target_path("/tmp/out", "a.js"), "/tmp/out/a.js");
}

#[test]
fn target_paths_resolve_parent_components() {
    assert_eq!(target_path("public", "../x.txt"), "x.txt");
    assert_eq!(target_path("public", "a/../b/x.txt"), "public/b/x.txt");
    assert_eq!(target_path("public", "../../x.txt"), "../x.txt");
    assert_eq!(target_path("/tmp/out", "../x.txt"), "/tmp/x.txt");
}

#[tokio::test]
async fn remove_deletes_files_and_prunes_empty_parents() -> TestResult {
    with_timeout(async {
        let fs = MockFileSystem::new();
        fs.add_file("build/js/a.js", "a");
        fs.add_file("build/js/b.js", "b");
        fs.add_file("build/css/c.css", "c");
        fs.add_file("keep.txt", "keep");

        let out = src(&fs, &["build/js/*.js"])
            .remove(shared(&fs))
            .into_files()
            .await?;
        assert!(out.is_empty());
        assert!(!fs.exists("build/js"));
        assert!(fs.is_dir("build"), "non-empty parent survives");

        src(&fs, &["build/**"]).remove(shared(&fs)).into_files().await?;
        assert!(!fs.exists("build"));
        assert!(fs.exists("keep.txt"));
        assert!(fs.is_dir(""), "build root is never removed");
        Ok(())
    })
    .await
}

#[tokio::test]
async fn removing_a_missing_file_is_not_an_error() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("dir/other.txt", "x");

    remove_path(&fs, "nope/file.txt").await?;
    remove_path(&fs, "dir/missing.txt").await?;
    assert!(fs.exists("dir/other.txt"));
    Ok(())
}

#[tokio::test]
async fn remove_runs_only_when_drained() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("a.txt", "a");

    let pending = FileStream::new(pipebuild::DiskFile::new("a.txt", shared(&fs))).remove(shared(&fs));
    assert!(fs.exists("a.txt"));

    pending.into_files().await?;
    assert!(!fs.exists("a.txt"));
    Ok(())
}
