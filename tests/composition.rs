// tests/composition.rs
mod common;
use crate::common::{init_tracing, mem, mock_context, paths_of, with_timeout, Gate, Recorder, TestResult};

use std::time::Duration;

use pipebuild::errors::BuildError;
use pipebuild::fs::mock::MockFileSystem;
use pipebuild::stream::{FileEntity, FileStream};
use pipebuild::transform::RenameTo;
use pipebuild::{parallel, series, Context, Task};

/// Task appending one memory file to whatever it receives.
fn append(recorder: &Recorder, label: &'static str) -> Task {
    let recorder = recorder.clone();
    Task::from_fn(move |_ctx: Context, input: Option<FileStream>| {
        let recorder = recorder.clone();
        async move {
            let mut files: Vec<FileEntity> = input.unwrap_or_default().into_files().await?.to_vec();
            recorder.record(label);
            files.push(mem(label));
            Ok::<_, BuildError>(files)
        }
    })
}

fn prefixing(prefix: &'static str) -> Task {
    Task::from_fn(move |_ctx: Context, input: Option<FileStream>| async move {
        Ok::<_, BuildError>(
            input
                .unwrap_or_default()
                .rename(RenameTo::with(move |path, _| format!("{prefix}/{path}"))),
        )
    })
}

fn sleeping(recorder: &Recorder, label: &'static str, ms: u64) -> Task {
    let recorder = recorder.clone();
    Task::from_fn(move |_ctx: Context, _input: Option<FileStream>| {
        let recorder = recorder.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            recorder.record(label);
            Ok::<_, BuildError>(mem(label))
        }
    })
}

#[tokio::test]
async fn series_threads_each_output_into_the_next_task() -> TestResult {
    with_timeout(async {
        init_tracing();
        let ctx = mock_context(&MockFileSystem::new());
        let recorder = Recorder::new();

        let chain = series([append(&recorder, "one"), append(&recorder, "two"), append(&recorder, "three")]);
        let out = chain.run(&ctx, None).await?.into_files().await?;

        assert_eq!(recorder.calls(), ["one", "two", "three"]);
        assert_eq!(paths_of(&out), ["one", "two", "three"]);
        assert!(chain.name().is_none());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn series_hands_its_input_to_the_first_task() -> TestResult {
    let ctx = mock_context(&MockFileSystem::new());
    let recorder = Recorder::new();

    let chain = series([append(&recorder, "x")]);
    let input = FileStream::new(vec![mem("in")]);
    let out = chain.run(&ctx, Some(input)).await?.into_files().await?;

    assert_eq!(paths_of(&out), ["in", "x"]);
    Ok(())
}

#[tokio::test]
async fn empty_series_passes_input_through() -> TestResult {
    let ctx = mock_context(&MockFileSystem::new());
    let chain = series(Vec::<Task>::new());

    let out = chain
        .run(&ctx, Some(FileStream::new(mem("a"))))
        .await?
        .into_files()
        .await?;
    assert_eq!(paths_of(&out), ["a"]);
    Ok(())
}

#[tokio::test]
async fn parallel_output_follows_task_order() -> TestResult {
    with_timeout(async {
        let ctx = mock_context(&MockFileSystem::new());
        let recorder = Recorder::new();

        let both = parallel([sleeping(&recorder, "slow", 50), sleeping(&recorder, "fast", 1)]);
        let out = both.run(&ctx, None).await?.into_files().await?;

        assert_eq!(recorder.calls(), ["fast", "slow"], "completion order");
        assert_eq!(paths_of(&out), ["slow", "fast"], "output order");
        Ok(())
    })
    .await
}

#[tokio::test]
async fn parallel_gives_every_task_the_same_input() -> TestResult {
    let ctx = mock_context(&MockFileSystem::new());
    let both = parallel([prefixing("one"), prefixing("two")]);

    let input = FileStream::new(vec![mem("a"), mem("b")]);
    let out = both.run(&ctx, Some(input)).await?.into_files().await?;

    assert_eq!(paths_of(&out), ["one/a", "one/b", "two/a", "two/b"]);
    Ok(())
}

#[tokio::test]
async fn parallel_fails_fast() -> TestResult {
    with_timeout(async {
        let ctx = mock_context(&MockFileSystem::new());
        let gate = Gate::new();
        let g = gate.clone();

        let stuck = Task::from_fn(move |_ctx: Context, _input: Option<FileStream>| {
            let g = g.clone();
            async move {
                g.wait().await;
                Ok::<_, BuildError>(())
            }
        });
        let failing = Task::from_fn(|_ctx: Context, _input: Option<FileStream>| async {
            Err::<(), _>(BuildError::config("nope"))
        });

        let err = parallel([stuck.clone(), failing])
            .run(&ctx, Some(FileStream::empty()))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::ConfigError(ref msg) if msg == "nope"));
        assert!(!stuck.is_running(), "abandoned run released its flag");
        Ok(())
    })
    .await
}

#[tokio::test]
async fn named_failure_inside_a_composition_stays_fatal() {
    let ctx = mock_context(&MockFileSystem::new());
    let recorder = Recorder::new();
    let broken = Task::named("broken", |_ctx: Context, _input: Option<FileStream>| async {
        Err::<(), _>(BuildError::config("bad"))
    });

    let err = series([append(&recorder, "first"), broken, append(&recorder, "never")])
        .run(&ctx, None)
        .await
        .unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(err.failed_task(), Some("broken"));
    assert_eq!(recorder.calls(), ["first"]);
}

#[tokio::test]
async fn shared_subtask_runs_once_across_a_parallel_composition() -> TestResult {
    let ctx = mock_context(&MockFileSystem::new());
    let recorder = Recorder::new();
    let common = append(&recorder, "common");

    let all = parallel([series([common.clone()]), series([common.clone()])]);
    let out = all.run(&ctx, None).await?.into_files().await?;

    assert_eq!(recorder.count("common"), 1);
    assert_eq!(paths_of(&out), ["common", "common"]);
    Ok(())
}
