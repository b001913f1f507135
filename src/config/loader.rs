// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{BuildFile, RawBuildFile};
use crate::errors::{BuildError, Result};

/// Parse a build file without semantic validation.
pub fn parse_str(contents: &str) -> Result<RawBuildFile> {
    Ok(toml::from_str(contents)?)
}

/// Read and parse a build file without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawBuildFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|err| BuildError::io(path, err))?;
    parse_str(&contents)
}

/// Read, parse and validate a build file: references resolve, no task
/// refers to itself, and the task graph has no cycles.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BuildFile> {
    let raw = load_from_path(path)?;
    BuildFile::try_from(raw)
}

/// Same as [`load_and_validate`] for build file text.
pub fn parse_and_validate(contents: &str) -> Result<BuildFile> {
    BuildFile::try_from(parse_str(contents)?)
}

/// `build.toml` in the current working directory.
pub fn default_build_file() -> PathBuf {
    PathBuf::from("build.toml")
}
