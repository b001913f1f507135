// src/transform/check.rs

//! Content checks that report problems per file and fail the stream once
//! every file has been seen.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use async_stream::try_stream;
use futures::stream::Stream;
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;
use crate::stream::{FileEntity, FileStream, MemoryFile, Producer};

/// A single problem found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// 1-based line, or 0 when the problem concerns the whole file.
    pub line: usize,
    pub rule: String,
    pub message: String,
}

/// Inspects realized files.
pub trait Checker: Send + Sync + Debug {
    fn name(&self) -> &str;

    fn check(&self, file: &MemoryFile) -> Vec<Violation>;
}

/// Options of the pattern checker.
///
/// Fields left unset fall back to the rc file named by `rc`, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckOptions {
    /// Regexes no line may match.
    pub forbid: Option<Vec<String>>,
    /// Regexes the file must match somewhere.
    pub require: Option<Vec<String>>,
    /// TOML file (relative to the build root) with default options.
    pub rc: Option<String>,
}

impl CheckOptions {
    /// `self` layered over `base`: every field set here wins.
    pub fn merged_over(self, base: CheckOptions) -> CheckOptions {
        CheckOptions {
            forbid: self.forbid.or(base.forbid),
            require: self.require.or(base.require),
            rc: self.rc,
        }
    }
}

#[derive(Debug, Clone)]
struct Rule {
    source: String,
    regex: Regex,
}

/// Regex based checker: `forbid` rules flag every matching line, `require`
/// rules flag files with no match at all.
#[derive(Debug, Clone)]
pub struct PatternChecker {
    forbid: Vec<Rule>,
    require: Vec<Rule>,
}

impl PatternChecker {
    pub fn new(options: &CheckOptions) -> Result<Self> {
        Ok(Self {
            forbid: compile_rules(options.forbid.as_deref().unwrap_or_default())?,
            require: compile_rules(options.require.as_deref().unwrap_or_default())?,
        })
    }

    /// Read the rc file named in `options` (if any), merge the explicit
    /// options over it and compile the result.
    pub async fn load(fs: &dyn FileSystem, options: &CheckOptions) -> Result<Self> {
        let Some(rc) = &options.rc else {
            return Self::new(options);
        };

        let raw = fs
            .read(Path::new(rc))
            .await
            .map_err(|err| BuildError::io(rc, err))?;
        let text = String::from_utf8_lossy(&raw);
        let base: CheckOptions = toml::from_str(&text)?;
        Self::new(&options.clone().merged_over(base))
    }
}

fn compile_rules(sources: &[String]) -> Result<Vec<Rule>> {
    sources
        .iter()
        .map(|source| {
            let regex = Regex::new(source).map_err(|err| {
                BuildError::config(format!("invalid check pattern '{source}': {err}"))
            })?;
            Ok(Rule {
                source: source.clone(),
                regex,
            })
        })
        .collect()
}

impl Checker for PatternChecker {
    fn name(&self) -> &str {
        "check"
    }

    fn check(&self, file: &MemoryFile) -> Vec<Violation> {
        let contents = file.contents();
        let mut violations = Vec::new();

        for (index, line) in contents.lines().enumerate() {
            for rule in &self.forbid {
                if rule.regex.is_match(line) {
                    violations.push(Violation {
                        line: index + 1,
                        rule: rule.source.clone(),
                        message: format!("forbidden pattern '{}'", rule.source),
                    });
                }
            }
        }

        for rule in &self.require {
            if !rule.regex.is_match(&contents) {
                violations.push(Violation {
                    line: 0,
                    rule: rule.source.clone(),
                    message: format!("required pattern '{}' not found", rule.source),
                });
            }
        }

        violations
    }
}

/// Run `checker` over every file, passing each file through unchanged.
///
/// Problems are reported as they are found; after the last file the stream
/// fails with [`BuildError::CheckFailed`] if any file had problems.
pub fn check(files: FileStream, checker: Arc<dyn Checker>) -> Producer {
    Producer::leaves(checked(files, checker))
}

fn checked(
    files: FileStream,
    checker: Arc<dyn Checker>,
) -> impl Stream<Item = Result<FileEntity>> + Send + 'static {
    try_stream! {
        let mut offending = 0usize;

        for await file in files {
            let file = file?.read().await?;
            let violations = checker.check(&file);
            if !violations.is_empty() {
                offending += 1;
                info!(
                    target: "pipebuild::build",
                    "{} found {} error(s) in file {}",
                    checker.name(),
                    violations.len(),
                    file.path()
                );
                for v in &violations {
                    warn!(
                        target: "pipebuild::build",
                        "  {}:{} [{}] {}",
                        file.path(),
                        v.line,
                        v.rule,
                        v.message
                    );
                }
            }
            yield FileEntity::Memory(file);
        }

        if offending > 0 {
            Err::<(), _>(BuildError::CheckFailed { files: offending })?;
        }
    }
}
