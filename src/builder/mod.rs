// src/builder/mod.rs

//! The orchestrator: loads a build definition once, lists its tasks and
//! runs requested tasks in order against a shared [`Context`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::config::loader::load_and_validate;
use crate::errors::{BuildError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::task::{Task, TaskRegistry};
use crate::types::{FlagValue, Flags};

mod context;

pub use context::Context;

/// Something that can populate a task registry: a parsed build file, or a
/// plain function for builds defined in code.
pub trait BuildDefinition {
    fn define(&self, tasks: &mut TaskRegistry) -> Result<()>;
}

impl<F> BuildDefinition for F
where
    F: Fn(&mut TaskRegistry) -> Result<()>,
{
    fn define(&self, tasks: &mut TaskRegistry) -> Result<()> {
        self(tasks)
    }
}

struct Loaded {
    build_file: PathBuf,
    fs: Arc<dyn FileSystem>,
    tasks: Arc<TaskRegistry>,
}

pub struct Builder {
    flags: Flags,
    loaded: Option<Loaded>,
    /// Set by the first `run`; every later run reuses it.
    active: OnceLock<Context>,
}

impl Builder {
    pub fn new(flags: Flags) -> Self {
        Self {
            flags,
            loaded: None,
            active: OnceLock::new(),
        }
    }

    /// Load a TOML build file. Task paths are resolved against the
    /// directory containing it.
    pub fn load(&mut self, build_file: impl AsRef<Path>) -> Result<()> {
        self.ensure_unloaded()?;

        let given = build_file.as_ref();
        let path = std::path::absolute(given).map_err(|err| BuildError::io(given, err))?;
        let definition = load_and_validate(&path)?;

        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        self.load_definition(path, Arc::new(RealFileSystem::new(root)), &definition)
    }

    /// Load tasks from any [`BuildDefinition`] operating on `fs`.
    pub fn load_definition(
        &mut self,
        build_file: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        definition: &dyn BuildDefinition,
    ) -> Result<()> {
        self.ensure_unloaded()?;

        let mut tasks = TaskRegistry::new();
        definition.define(&mut tasks)?;

        let build_file = build_file.into();
        debug!(build_file = %build_file.display(), tasks = tasks.len(), "build definition loaded");

        self.loaded = Some(Loaded {
            build_file,
            fs,
            tasks: Arc::new(tasks),
        });
        Ok(())
    }

    fn ensure_unloaded(&self) -> Result<()> {
        match &self.loaded {
            Some(loaded) => Err(BuildError::config(format!(
                "Build file already loaded: {}",
                loaded.build_file.display()
            ))),
            None => Ok(()),
        }
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.loaded
            .as_ref()
            .ok_or_else(|| BuildError::config("No build file loaded"))
    }

    pub fn build_file(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.build_file.as_path())
    }

    pub fn tasks(&self) -> Option<&TaskRegistry> {
        self.loaded.as_ref().map(|l| l.tasks.as_ref())
    }

    /// Log and return the names of all defined tasks.
    pub fn list_tasks(&self) -> Result<Vec<String>> {
        let loaded = self.loaded()?;
        let ctx = self.context(loaded);

        ctx.log(format_args!("Tasks for {}:", loaded.build_file.display()));
        let names: Vec<String> = loaded.tasks.names().map(str::to_owned).collect();
        for name in &names {
            ctx.log(format_args!("  {name}"));
        }
        Ok(names)
    }

    /// Run the named tasks one after another.
    ///
    /// Every name is resolved before anything runs; an unknown name fails
    /// the whole call.
    pub async fn run<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let loaded = self.loaded()?;
        let ctx = self.context(loaded);

        ctx.log(format_args!("Using build file {}", loaded.build_file.display()));

        let tasks = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                loaded
                    .tasks
                    .by_name(name)
                    .cloned()
                    .ok_or_else(|| BuildError::TaskNotFound(name.to_string()))
            })
            .collect::<Result<Vec<Task>>>()?;

        for task in tasks {
            task.run(&ctx, None).await?;
        }
        Ok(())
    }

    /// The context shared by every run, created on first use.
    fn context(&self, loaded: &Loaded) -> Context {
        self.active
            .get_or_init(|| {
                Context::from_parts(
                    self.flags.clone(),
                    Arc::clone(&loaded.fs),
                    Arc::clone(&loaded.tasks),
                    Some(loaded.build_file.clone()),
                )
            })
            .clone()
    }

    /// The active context, once a run or listing has started.
    pub fn active_context(&self) -> Option<&Context> {
        self.active.get()
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.has(name)
    }

    pub fn get_flag(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }
}
