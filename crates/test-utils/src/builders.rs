#![allow(dead_code)]

use std::collections::BTreeMap;

use pipebuild::config::model::{DestConfig, RenameConfig, StepConfig};
use pipebuild::config::{BuildFile, Patterns, RawBuildFile, TaskConfig};
use pipebuild::transform::CheckOptions;

/// Builder for `BuildFile` to simplify test setup.
pub struct BuildFileBuilder {
    file: RawBuildFile,
}

impl BuildFileBuilder {
    pub fn new() -> Self {
        Self {
            file: RawBuildFile {
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.file.task.insert(name.to_string(), task);
        self
    }

    pub fn raw(self) -> RawBuildFile {
        self.file
    }

    pub fn build(self) -> BuildFile {
        BuildFile::try_from(self.file).expect("Failed to build valid build file from builder")
    }
}

impl Default for BuildFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    /// A pipeline task discovering `patterns`.
    pub fn src(patterns: &[&str]) -> Self {
        Self {
            task: TaskConfig {
                src: Some(Patterns::Many(
                    patterns.iter().map(|p| p.to_string()).collect(),
                )),
                ..TaskConfig::default()
            },
        }
    }

    /// A pipeline task working on its input.
    pub fn steps() -> Self {
        Self {
            task: TaskConfig::default(),
        }
    }

    pub fn series(names: &[&str]) -> Self {
        Self {
            task: TaskConfig {
                series: Some(names.iter().map(|n| n.to_string()).collect()),
                ..TaskConfig::default()
            },
        }
    }

    pub fn parallel(names: &[&str]) -> Self {
        Self {
            task: TaskConfig {
                parallel: Some(names.iter().map(|n| n.to_string()).collect()),
                ..TaskConfig::default()
            },
        }
    }

    pub fn rename(mut self, path: &str) -> Self {
        self.task
            .steps
            .push(StepConfig::Rename(RenameConfig::Literal(path.to_string())));
        self
    }

    pub fn rename_regex(mut self, regex: &str, replace: &str) -> Self {
        self.task.steps.push(StepConfig::Rename(RenameConfig::Regex {
            regex: regex.to_string(),
            replace: replace.to_string(),
        }));
        self
    }

    pub fn dest(mut self, dir: &str) -> Self {
        self.task
            .steps
            .push(StepConfig::Dest(DestConfig::Dir(dir.to_string())));
        self
    }

    pub fn dest_in_place(mut self) -> Self {
        self.task.steps.push(StepConfig::Dest(DestConfig::InPlace(true)));
        self
    }

    pub fn remove(mut self) -> Self {
        self.task.steps.push(StepConfig::Remove);
        self
    }

    pub fn check(mut self, options: CheckOptions) -> Self {
        self.task.steps.push(StepConfig::Check(options));
        self
    }

    pub fn watch(mut self, names: &[&str]) -> Self {
        self.task.steps.push(StepConfig::Watch(
            names.iter().map(|n| n.to_string()).collect(),
        ));
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
