// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::{FlagValue, Flags};

/// Task run when none is named on the command line.
pub const DEFAULT_TASK: &str = "default";

/// Command-line arguments for `pipebuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipebuild",
    version,
    about = "Run file-streaming build tasks defined in a build file.",
    long_about = None
)]
pub struct CliArgs {
    /// Tasks to run, in order. Defaults to `default`.
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,

    /// Path to the build file (TOML).
    #[arg(long, value_name = "PATH", default_value = "build.toml")]
    pub buildfile: String,

    /// List the tasks defined in the build file and exit.
    #[arg(long = "tasks")]
    pub list_tasks: bool,

    /// User flag handed to every task, as `NAME` or `NAME=VALUE`.
    /// May be repeated.
    #[arg(short = 'f', long = "flag", value_name = "NAME[=VALUE]", value_parser = parse_flag)]
    pub flags: Vec<(String, FlagValue)>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPEBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    pub fn user_flags(&self) -> Flags {
        self.flags.iter().cloned().collect()
    }

    /// Requested task names, falling back to [`DEFAULT_TASK`].
    pub fn task_names(&self) -> Vec<String> {
        if self.tasks.is_empty() {
            vec![DEFAULT_TASK.to_string()]
        } else {
            self.tasks.clone()
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse `NAME` into a switch and `NAME=VALUE` into a valued flag.
pub fn parse_flag(raw: &str) -> Result<(String, FlagValue), String> {
    let (name, value) = match raw.split_once('=') {
        Some((name, value)) => (name.trim(), FlagValue::Value(value.to_string())),
        None => (raw.trim(), FlagValue::Switch),
    };
    if name.is_empty() {
        return Err(format!("flag '{raw}' has no name"));
    }
    Ok((name.to_string(), value))
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
