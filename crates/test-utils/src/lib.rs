pub mod builders;
pub mod recording;

use std::sync::{Arc, Once};

use tracing_subscriber::{fmt, EnvFilter};

use pipebuild::fs::mock::MockFileSystem;
use pipebuild::{Context, FileEntity, Flags, MemoryFile};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// A context over `fs` with no flags and no registered tasks.
pub fn mock_context(fs: &MockFileSystem) -> Context {
    Context::new(Flags::new(), Arc::new(fs.clone()))
}

/// Memory-backed entities with the given paths; each file's content is its
/// own path.
pub fn memory_files(paths: &[&str]) -> Vec<FileEntity> {
    paths
        .iter()
        .map(|p| FileEntity::Memory(MemoryFile::new(*p, p.as_bytes().to_vec())))
        .collect()
}

/// Paths of a drained sequence, in order.
pub fn paths_of(files: &[FileEntity]) -> Vec<String> {
    files.iter().map(|f| f.path().to_string()).collect()
}
