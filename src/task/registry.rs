// src/task/registry.rs

use std::collections::HashMap;
use std::future::Future;

use crate::builder::Context;
use crate::errors::Result;
use crate::stream::{FileStream, Producer};

use super::{Task, TaskId};

/// Named tasks of a loaded build definition.
///
/// Names map to task identities; registering the same task under several
/// names keeps a single instance (and a single cache).
#[derive(Debug, Default, Clone)]
pub struct TaskRegistry {
    order: Vec<String>,
    by_name: HashMap<String, TaskId>,
    tasks: HashMap<TaskId, Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task` under `name`.
    ///
    /// The first name a task is registered under becomes its display name.
    /// Re-registering a name points it at the new task.
    pub fn register(&mut self, name: impl Into<String>, task: Task) -> TaskId {
        let name = name.into();
        task.name_if_unset(name.clone());

        let id = task.id();
        self.tasks.entry(id).or_insert(task);

        if self.by_name.insert(name.clone(), id).is_none() {
            self.order.push(name);
        }
        id
    }

    pub fn register_fn<F, Fut, P>(&mut self, name: impl Into<String>, f: F) -> TaskId
    where
        F: Fn(Context, Option<FileStream>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P>> + Send + 'static,
        P: Into<Producer> + Send + 'static,
    {
        self.register(name, Task::from_fn(f))
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Task> {
        self.by_name.get(name).and_then(|id| self.tasks.get(id))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Task names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
