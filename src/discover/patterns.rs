// src/discover/patterns.rs

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::errors::{BuildError, Result};
use crate::fs::{to_slash, FileSystem};
use crate::types::MatchOptions;

/// Characters that make a path component a pattern rather than a literal.
const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}'];

/// A single compiled positive pattern.
#[derive(Debug, Clone)]
pub struct PositivePattern {
    source: String,
    /// Longest literal directory prefix; walking starts here.
    base: PathBuf,
    matcher: GlobMatcher,
    /// Pattern names a dot-entry explicitly, so hidden entries may match.
    mentions_dot: bool,
}

impl PositivePattern {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

/// Positive and negative patterns compiled from a discovery request.
#[derive(Debug, Clone)]
pub struct PatternSet {
    positive: Vec<PositivePattern>,
    negative: Option<GlobSet>,
    options: MatchOptions,
}

/// Split raw patterns into positive and negative lists.
///
/// A leading `!` marks a negative pattern unless the pattern starts with the
/// extended-glob form `!(`. Surrounding whitespace and a leading `./` are
/// ignored.
pub fn split_patterns<I, S>(globs: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut positive = Vec::new();
    let mut negative = Vec::new();

    for glob in globs {
        let glob = glob.as_ref().trim();
        if glob.starts_with('!') && !glob.starts_with("!(") {
            negative.push(strip_dot_slash(&glob[1..]).to_string());
        } else {
            positive.push(strip_dot_slash(glob).to_string());
        }
    }

    (positive, negative)
}

fn strip_dot_slash(glob: &str) -> &str {
    glob.strip_prefix("./").unwrap_or(glob)
}

impl PatternSet {
    /// Compile discovery patterns.
    ///
    /// Fails before any filesystem access if only negative patterns are given
    /// or a pattern does not compile.
    pub fn compile<I, S>(globs: I, options: &MatchOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (positive, negative) = split_patterns(globs);

        if positive.is_empty() && !negative.is_empty() {
            return Err(BuildError::config(
                "Need at least one positive glob to be negated",
            ));
        }

        let positive = positive
            .into_iter()
            .map(|source| {
                let matcher = build_glob(&source, options)?.compile_matcher();
                Ok(PositivePattern {
                    base: literal_base(&source),
                    mentions_dot: source.starts_with('.') || source.contains("/."),
                    matcher,
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let negative = if negative.is_empty() {
            None
        } else {
            Some(build_globset(&negative, options)?)
        };

        Ok(Self {
            positive,
            negative,
            options: *options,
        })
    }

    pub fn positive(&self) -> &[PositivePattern] {
        &self.positive
    }

    /// Whether `rel_path` matches any negative pattern.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.negative
            .as_ref()
            .is_some_and(|set| set.is_match(rel_path))
    }

    /// All files (never directories) below the pattern's base matching the
    /// positive pattern at `index`, sorted by path.
    ///
    /// A missing base directory yields no matches.
    pub async fn matching_files(&self, fs: &dyn FileSystem, index: usize) -> Result<Vec<String>> {
        let Some(pattern) = self.positive.get(index) else {
            return Ok(Vec::new());
        };

        let mut files = Vec::new();
        let mut stack = vec![pattern.base.clone()];
        // Resolved directories already walked; a symlinked directory that
        // points back into the tree is skipped.
        let mut visited = HashSet::new();

        while let Some(dir) = stack.pop() {
            if !visited.insert(fs.resolve(&dir)) {
                debug!(dir = %dir.display(), "skipping directory already walked");
                continue;
            }
            let entries = match fs.read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if is_absent(&err) => continue,
                Err(err) => return Err(BuildError::io(dir, err)),
            };

            for entry in entries {
                if !self.options.dot && !pattern.mentions_dot && is_hidden(&entry.path) {
                    continue;
                }
                if entry.is_dir {
                    stack.push(entry.path);
                    continue;
                }
                let rel = to_slash(&entry.path);
                if pattern.matcher.is_match(&rel) {
                    files.push(rel);
                }
            }
        }

        files.sort();
        debug!(pattern = %pattern.source, matches = files.len(), "evaluated glob");
        Ok(files)
    }
}

fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

/// Leading components of `pattern` that contain no glob syntax, excluding
/// the final component.
fn literal_base(pattern: &str) -> PathBuf {
    let components: Vec<&str> = pattern.split('/').collect();
    let mut base = PathBuf::new();
    for component in &components[..components.len().saturating_sub(1)] {
        if component.contains(GLOB_META) {
            break;
        }
        if component.is_empty() {
            // Leading `/` of an absolute pattern.
            if base.as_os_str().is_empty() {
                base.push("/");
            }
            continue;
        }
        base.push(component);
    }
    base
}

fn build_glob(pattern: &str, options: &MatchOptions) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .case_insensitive(options.case_insensitive)
        .literal_separator(options.literal_separator)
        .backslash_escape(options.backslash_escape)
        .build()
        .map_err(|source| BuildError::Glob {
            pattern: pattern.to_string(),
            source,
        })
}

fn build_globset(patterns: &[String], options: &MatchOptions) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(build_glob(pat, options)?);
    }
    builder.build().map_err(|source| BuildError::Glob {
        pattern: patterns.join(", "),
        source,
    })
}
