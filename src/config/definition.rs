// src/config/definition.rs

//! Turning a validated build file into runnable tasks.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::builder::{BuildDefinition, Context};
use crate::config::model::{BuildFile, DestConfig, RenameConfig, StepConfig, TaskConfig};
use crate::discover::PatternSet;
use crate::errors::{BuildError, Result};
use crate::stream::FileStream;
use crate::task::{parallel, series, Task, TaskRegistry};
use crate::transform::{CheckOptions, PatternChecker, RenameTo};
use crate::types::MatchOptions;

impl BuildDefinition for BuildFile {
    fn define(&self, tasks: &mut TaskRegistry) -> Result<()> {
        // Referenced tasks are built first so compositions can hold their
        // handles; registration then follows the table's sorted name order.
        let mut built: HashMap<&str, Task> = HashMap::new();
        for name in self.task_order()? {
            let Some(config) = self.task(name) else {
                continue;
            };
            let task = build_task(config, &built)?;
            built.insert(name, task);
        }

        for name in self.tasks().keys() {
            if let Some(task) = built.remove(name.as_str()) {
                tasks.register(name.as_str(), task);
            }
        }
        Ok(())
    }
}

type Built<'a> = HashMap<&'a str, Task>;

fn build_task(config: &TaskConfig, built: &Built<'_>) -> Result<Task> {
    if let Some(names) = &config.series {
        return Ok(series(lookup(names, built)?));
    }
    if let Some(names) = &config.parallel {
        return Ok(parallel(lookup(names, built)?));
    }

    let pipeline = Arc::new(Pipeline::compile(config, built)?);
    Ok(Task::from_fn(move |ctx: Context, input: Option<FileStream>| {
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.run(&ctx, input).await }
    }))
}

fn lookup(names: &[String], built: &Built<'_>) -> Result<Vec<Task>> {
    names
        .iter()
        .map(|name| {
            built
                .get(name.as_str())
                .cloned()
                .ok_or_else(|| BuildError::TaskNotFound(name.clone()))
        })
        .collect()
}

/// A `src` + `steps` task, compiled once at load time.
#[derive(Debug)]
struct Pipeline {
    src: Option<Vec<String>>,
    options: MatchOptions,
    steps: Vec<Step>,
}

#[derive(Debug)]
enum Step {
    Rename(RenameTo),
    Dest(Option<String>),
    Remove,
    Check(CheckOptions),
    Watch(Vec<Task>),
}

impl Pipeline {
    fn compile(config: &TaskConfig, built: &Built<'_>) -> Result<Self> {
        let src = config.src.as_ref().map(|patterns| patterns.to_vec());
        if let Some(globs) = &src {
            // Surface pattern errors at load time.
            PatternSet::compile(globs, &config.options)?;
        }

        let steps = config
            .steps
            .iter()
            .map(|step| compile_step(step, built))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            src,
            options: config.options,
            steps,
        })
    }

    async fn run(&self, ctx: &Context, input: Option<FileStream>) -> Result<FileStream> {
        let mut files = match &self.src {
            Some(globs) => ctx.src_with(globs, &self.options)?,
            None => input.unwrap_or_default(),
        };

        for step in &self.steps {
            files = match step {
                Step::Rename(target) => files.rename(target.clone()),
                Step::Dest(dir) => files.dest(ctx.fs(), dir.clone()),
                Step::Remove => files.remove(ctx.fs()),
                Step::Check(options) => {
                    let checker = PatternChecker::load(ctx.fs().as_ref(), options).await?;
                    files.check(Arc::new(checker))
                }
                Step::Watch(tasks) => files.watch(ctx, tasks.clone()),
            };
        }

        Ok(files)
    }
}

fn compile_step(step: &StepConfig, built: &Built<'_>) -> Result<Step> {
    Ok(match step {
        StepConfig::Rename(RenameConfig::Literal(path)) => {
            if path.is_empty() {
                return Err(BuildError::config("`rename` needs a non-empty path"));
            }
            Step::Rename(RenameTo::Path(path.clone()))
        }
        StepConfig::Rename(RenameConfig::Regex { regex, replace }) => {
            let regex = Regex::new(regex).map_err(|err| {
                BuildError::config(format!("invalid rename regex '{regex}': {err}"))
            })?;
            let replace = replace.clone();
            Step::Rename(RenameTo::with(move |path, _| {
                regex.replace(path, replace.as_str()).into_owned()
            }))
        }
        StepConfig::Dest(DestConfig::Dir(dir)) => Step::Dest(Some(dir.clone())),
        StepConfig::Dest(DestConfig::InPlace(true)) => Step::Dest(None),
        StepConfig::Dest(DestConfig::InPlace(false)) => {
            return Err(BuildError::config(
                "`dest` takes a directory or `true` to write files in place",
            ));
        }
        StepConfig::Remove => Step::Remove,
        StepConfig::Check(options) => {
            if options.rc.is_none() {
                // Without an rc file the options are final: check them now.
                PatternChecker::new(options)?;
            }
            Step::Check(options.clone())
        }
        StepConfig::Watch(names) => Step::Watch(lookup(names, built)?),
    })
}
