// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::transform::CheckOptions;
use crate::types::MatchOptions;

/// Build file as read from TOML, before validation.
///
/// ```toml
/// [task.scripts]
/// src = ["src/**/*.js", "!src/**/*.test.js"]
/// steps = [
///     { rename = { regex = "^src/", replace = "out/" } },
///     { dest = "dist" },
/// ]
///
/// [task.clean]
/// src = "dist/**"
/// steps = ["remove"]
///
/// [task.default]
/// series = ["clean", "scripts"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawBuildFile {
    /// All tasks from `[task.<name>]`.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated build file. Only constructed through
/// `TryFrom<RawBuildFile>`, so every reference in it resolves and the task
/// graph is acyclic.
#[derive(Debug, Clone)]
pub struct BuildFile {
    task: BTreeMap<String, TaskConfig>,
}

impl BuildFile {
    pub(crate) fn new_unchecked(task: BTreeMap<String, TaskConfig>) -> Self {
        Self { task }
    }

    pub fn tasks(&self) -> &BTreeMap<String, TaskConfig> {
        &self.task
    }

    pub fn task(&self, name: &str) -> Option<&TaskConfig> {
        self.task.get(name)
    }
}

/// One `[task.<name>]` table.
///
/// A task is either a pipeline (`src` and/or `steps`) or a composition
/// (`series` or `parallel`), never both.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Discovery patterns. Without them the pipeline runs on the task's
    /// input.
    #[serde(default)]
    pub src: Option<Patterns>,

    #[serde(default)]
    pub options: MatchOptions,

    #[serde(default)]
    pub steps: Vec<StepConfig>,

    #[serde(default)]
    pub series: Option<Vec<String>>,

    #[serde(default)]
    pub parallel: Option<Vec<String>>,
}

impl TaskConfig {
    pub fn is_composition(&self) -> bool {
        self.series.is_some() || self.parallel.is_some()
    }

    /// Every task name this task refers to.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        let composed = self
            .series
            .iter()
            .chain(self.parallel.iter())
            .flatten()
            .map(String::as_str);
        let watched = self
            .steps
            .iter()
            .filter_map(|step| match step {
                StepConfig::Watch(names) => Some(names),
                _ => None,
            })
            .flatten()
            .map(String::as_str);
        composed.chain(watched)
    }
}

/// A single pattern or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Patterns::One(p) => vec![p.clone()],
            Patterns::Many(ps) => ps.clone(),
        }
    }
}

/// One pipeline step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepConfig {
    Rename(RenameConfig),
    Dest(DestConfig),
    Remove,
    Check(CheckOptions),
    /// Watch the files at this point and rerun the named tasks on change.
    Watch(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RenameConfig {
    /// Same literal path for every file.
    Literal(String),
    /// Regex replacement on the old path.
    Regex {
        regex: String,
        #[serde(default)]
        replace: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DestConfig {
    /// Write below this directory.
    Dir(String),
    /// `true` writes every file back to its own path.
    InPlace(bool),
}
