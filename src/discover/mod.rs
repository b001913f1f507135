// src/discover/mod.rs

//! File discovery from glob patterns.
//!
//! Patterns prefixed with `!` exclude paths. Every positive pattern is
//! evaluated against the filesystem (lazily, on first poll), the union of
//! matches is deduplicated in first-seen order, and whatever survives the
//! negative patterns is yielded as disk-backed entities.

pub mod patterns;

use std::sync::Arc;

use futures::future;
use futures::stream::TryStreamExt;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::stream::{unique, DiskFile, FileEntity, FileStream, Nested, Producer};
use crate::types::MatchOptions;

pub use patterns::{split_patterns, PatternSet, PositivePattern};

/// Build a lazy stream of the files matching `globs`.
///
/// Configuration problems (no positive pattern, invalid syntax) are reported
/// here, before anything touches the filesystem.
pub fn src<I, S>(fs: Arc<dyn FileSystem>, globs: I, options: &MatchOptions) -> Result<FileStream>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let set = Arc::new(PatternSet::compile(globs, options)?);

    let per_pattern: Nested<String> = (0..set.positive().len())
        .map(|index| {
            let set = Arc::clone(&set);
            let fs = Arc::clone(&fs);
            Nested::deferred(async move {
                let paths = set.matching_files(fs.as_ref(), index).await?;
                Ok(paths.into_iter().map(Nested::Leaf).collect())
            })
        })
        .collect();

    let files = unique(per_pattern)
        .try_filter(move |path| future::ready(!set.is_excluded(path)))
        .map_ok(move |path| FileEntity::Disk(DiskFile::new(path, Arc::clone(&fs))));

    Ok(FileStream::new(Producer::leaves(files)))
}
