// tests/discovery.rs
mod common;
use crate::common::{init_tracing, paths_of, TestResult};

use std::sync::Arc;

use pipebuild::discover::{self, split_patterns};
use pipebuild::errors::BuildError;
use pipebuild::fs::mock::MockFileSystem;
use pipebuild::fs::{FileSystem, RealFileSystem};
use pipebuild::MatchOptions;

fn project() -> Arc<dyn FileSystem> {
    let fs = MockFileSystem::new();
    fs.add_file("src/a.js", "a");
    fs.add_file("src/b.js", "b");
    fs.add_file("src/a.test.js", "test");
    fs.add_file("src/.hidden.js", "hidden");
    fs.add_file("src/sub/c.js", "c");
    fs.add_file("README.md", "readme");
    fs.add_file(".git/config", "git");
    Arc::new(fs)
}

async fn discover(globs: &[&str], options: &MatchOptions) -> Result<Vec<String>, BuildError> {
    let files = discover::src(project(), globs, options)?.into_files().await?;
    Ok(paths_of(&files))
}

#[tokio::test]
async fn single_star_stays_within_one_directory() -> TestResult {
    init_tracing();
    let paths = discover(&["src/*.js"], &MatchOptions::default()).await?;
    assert_eq!(paths, ["src/a.js", "src/a.test.js", "src/b.js"]);
    Ok(())
}

#[tokio::test]
async fn negative_patterns_exclude_matches() -> TestResult {
    let paths = discover(&["src/**/*.js", "!src/**/*.test.js"], &MatchOptions::default()).await?;
    assert_eq!(paths, ["src/a.js", "src/b.js", "src/sub/c.js"]);
    Ok(())
}

#[tokio::test]
async fn union_is_deduplicated_in_first_seen_order() -> TestResult {
    let paths = discover(&["src/b.js", "src/*.js"], &MatchOptions::default()).await?;
    assert_eq!(paths, ["src/b.js", "src/a.js", "src/a.test.js"]);
    Ok(())
}

#[tokio::test]
async fn directories_are_never_yielded() -> TestResult {
    let paths = discover(&["src/*"], &MatchOptions::default()).await?;
    assert_eq!(paths, ["src/a.js", "src/a.test.js", "src/b.js"]);
    Ok(())
}

#[tokio::test]
async fn hidden_entries_need_the_dot_option() -> TestResult {
    assert!(discover(&["**/config"], &MatchOptions::default()).await?.is_empty());

    let dot = MatchOptions {
        dot: true,
        ..MatchOptions::default()
    };
    assert_eq!(discover(&["**/config"], &dot).await?, [".git/config"]);
    assert_eq!(
        discover(&["src/*.js"], &dot).await?,
        ["src/.hidden.js", "src/a.js", "src/a.test.js", "src/b.js"]
    );
    Ok(())
}

#[tokio::test]
async fn missing_base_directory_yields_nothing() -> TestResult {
    let paths = discover(&["missing/**/*.js"], &MatchOptions::default()).await?;
    assert!(paths.is_empty());
    Ok(())
}

#[test]
fn only_negative_patterns_is_a_configuration_error() {
    let err = discover::src(project(), ["!src/*.js"], &MatchOptions::default()).unwrap_err();
    match err {
        BuildError::ConfigError(msg) => {
            assert_eq!(msg, "Need at least one positive glob to be negated");
        }
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn invalid_pattern_is_reported_with_the_pattern() {
    let err = discover::src(project(), ["src/[a"], &MatchOptions::default()).unwrap_err();
    match err {
        BuildError::Glob { pattern, .. } => assert_eq!(pattern, "src/[a"),
        other => panic!("Expected Glob error, got: {other:?}"),
    }
}

#[test]
fn split_patterns_separates_negations() {
    let (positive, negative) = split_patterns(["./src/*.js", "!src/*.test.js", " lib/** "]);
    assert_eq!(positive, ["src/*.js", "lib/**"]);
    assert_eq!(negative, ["src/*.test.js"]);
}

#[tokio::test]
async fn case_insensitive_matching() -> TestResult {
    let options = MatchOptions {
        case_insensitive: true,
        ..MatchOptions::default()
    };
    assert_eq!(discover(&["readme.MD"], &options).await?, ["README.md"]);
    assert!(discover(&["readme.MD"], &MatchOptions::default()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn real_filesystem_paths_are_relative_to_the_root() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("docs/guide"))?;
    std::fs::write(dir.path().join("docs/intro.txt"), "intro")?;
    std::fs::write(dir.path().join("docs/guide/setup.txt"), "setup")?;
    std::fs::write(dir.path().join("docs/logo.png"), "png")?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new(dir.path()));
    let files = discover::src(fs, ["**/*.txt"], &MatchOptions::default())?
        .into_files()
        .await?;

    assert_eq!(paths_of(&files), ["docs/guide/setup.txt", "docs/intro.txt"]);
    let first = files[0].read().await?;
    assert_eq!(first.contents(), "setup");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn symlink_cycles_are_walked_once() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("a"))?;
    std::fs::write(dir.path().join("a/x.txt"), "x")?;
    std::os::unix::fs::symlink(".", dir.path().join("a/loop"))?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new(dir.path()));
    let files = discover::src(fs, ["a/**/*.txt"], &MatchOptions::default())?
        .into_files()
        .await?;

    assert_eq!(paths_of(&files), ["a/x.txt"]);
    Ok(())
}
