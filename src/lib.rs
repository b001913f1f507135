// src/lib.rs

pub mod builder;
pub mod cli;
pub mod config;
pub mod discover;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod stream;
pub mod task;
pub mod transform;
pub mod types;
pub mod watch;

use crate::builder::Builder;
use crate::cli::CliArgs;
use crate::errors::Result;

pub use crate::builder::{BuildDefinition, Context};
pub use crate::errors::BuildError;
pub use crate::stream::{DiskFile, FileEntity, FileStream, MemoryFile, Producer};
pub use crate::task::{parallel, series, Task, TaskRegistry};
pub use crate::types::{FlagValue, Flags, MatchOptions};

/// High-level entry point used by `main.rs`: load the build file, then
/// either list its tasks or run the requested ones.
pub async fn run(args: CliArgs) -> Result<()> {
    let mut builder = Builder::new(args.user_flags());
    builder.load(&args.buildfile)?;

    if args.list_tasks {
        builder.list_tasks()?;
        return Ok(());
    }

    builder.run(&args.task_names()).await
}
