#![allow(dead_code, unused_imports)]

pub use pipebuild_test_utils::builders;
pub use pipebuild_test_utils::recording::{Gate, Recorder};
pub use pipebuild_test_utils::{init_tracing, memory_files, mock_context, paths_of, with_timeout};

use pipebuild::{FileEntity, MemoryFile};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Memory file whose content is its own path.
pub fn mem(path: &str) -> FileEntity {
    FileEntity::Memory(MemoryFile::new(path, path.as_bytes().to_vec()))
}
