// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{BuildFile, RawBuildFile, TaskConfig};
use crate::errors::{BuildError, Result};

impl TryFrom<RawBuildFile> for BuildFile {
    type Error = BuildError;

    fn try_from(raw: RawBuildFile) -> std::result::Result<Self, Self::Error> {
        validate_raw(&raw)?;
        Ok(BuildFile::new_unchecked(raw.task))
    }
}

fn validate_raw(file: &RawBuildFile) -> Result<()> {
    ensure_has_tasks(file)?;
    validate_task_shapes(file)?;
    validate_references(file)?;
    task_order(file.task.iter())?;
    Ok(())
}

fn ensure_has_tasks(file: &RawBuildFile) -> Result<()> {
    if file.task.is_empty() {
        return Err(BuildError::config(
            "build file must contain at least one [task.<name>] section",
        ));
    }
    Ok(())
}

fn validate_task_shapes(file: &RawBuildFile) -> Result<()> {
    for (name, task) in file.task.iter() {
        if task.series.is_some() && task.parallel.is_some() {
            return Err(BuildError::config(format!(
                "task '{name}' cannot set both `series` and `parallel`"
            )));
        }
        if task.is_composition() && (task.src.is_some() || !task.steps.is_empty()) {
            return Err(BuildError::config(format!(
                "task '{name}' mixes a composition with `src`/`steps`"
            )));
        }
        if !task.is_composition() && task.src.is_none() && task.steps.is_empty() {
            return Err(BuildError::config(format!(
                "task '{name}' has nothing to do: set `src`, `steps`, `series` or `parallel`"
            )));
        }
    }
    Ok(())
}

fn validate_references(file: &RawBuildFile) -> Result<()> {
    for (name, task) in file.task.iter() {
        for reference in task.references() {
            if !file.task.contains_key(reference) {
                return Err(BuildError::config(format!(
                    "task '{name}' refers to unknown task '{reference}'"
                )));
            }
            if reference == name {
                return Err(BuildError::config(format!(
                    "task '{name}' cannot refer to itself"
                )));
            }
        }
    }
    Ok(())
}

/// Task names ordered so that every task comes after the tasks it refers
/// to.
///
/// Edge direction: referenced -> referencing. For
///
/// ```toml
/// [task.default]
/// series = ["clean"]
/// ```
///
/// the edge is `clean -> default`.
pub(crate) fn task_order<'a, I>(tasks: I) -> Result<Vec<&'a str>>
where
    I: IntoIterator<Item = (&'a String, &'a TaskConfig)>,
{
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    let tasks: Vec<_> = tasks.into_iter().collect();

    for &(name, _) in &tasks {
        graph.add_node(name.as_str());
    }
    for &(name, task) in &tasks {
        for reference in task.references() {
            graph.add_edge(reference, name.as_str(), ());
        }
    }

    toposort(&graph, None).map_err(|cycle| {
        BuildError::TaskCycle(format!(
            "cycle detected in task graph involving task '{}'",
            cycle.node_id()
        ))
    })
}

impl BuildFile {
    /// See [`task_order`].
    pub fn task_order(&self) -> Result<Vec<&str>> {
        task_order(self.tasks().iter())
    }
}
