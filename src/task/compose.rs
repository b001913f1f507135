// src/task/compose.rs

//! Sequential and concurrent composition of tasks.

use std::sync::Arc;

use futures::future::try_join_all;

use crate::builder::Context;
use crate::errors::BuildError;
use crate::stream::FileStream;

use super::Task;

/// Unnamed task running `tasks` one after another, each receiving the
/// previous one's output. The first task receives the composition's input.
///
/// With no tasks the input is passed through.
pub fn series<I>(tasks: I) -> Task
where
    I: IntoIterator<Item = Task>,
{
    let tasks: Arc<[Task]> = tasks.into_iter().collect();

    Task::from_fn(move |ctx: Context, input: Option<FileStream>| {
        let tasks = Arc::clone(&tasks);
        async move {
            let mut current = input;
            for task in tasks.iter() {
                current = Some(task.run(&ctx, current).await?);
            }
            Ok::<_, BuildError>(current.unwrap_or_default())
        }
    })
}

/// Unnamed task running `tasks` concurrently on the same input.
///
/// Outputs are concatenated in task order, not completion order. The first
/// failure fails the composition and abandons the remaining runs.
pub fn parallel<I>(tasks: I) -> Task
where
    I: IntoIterator<Item = Task>,
{
    let tasks: Arc<[Task]> = tasks.into_iter().collect();

    Task::from_fn(move |ctx: Context, input: Option<FileStream>| {
        let tasks = Arc::clone(&tasks);
        async move {
            // Every branch needs its own cursor over the same files.
            let input = match input {
                Some(files) => Some(files.ensure_completion().await?),
                None => None,
            };
            let runs = tasks
                .iter()
                .map(|task| task.run(&ctx, input.as_ref().and_then(FileStream::replay)));
            try_join_all(runs).await
        }
    })
}
