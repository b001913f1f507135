// src/stream/mod.rs

//! File entities and the lazy streams that carry them.
//!
//! - [`file`] defines the disk-backed and memory-backed entities.
//! - [`nested`] defines the closed producer type and `flatten` / `unique`.
//! - [`files`] defines [`FileStream`] and its transform-chaining helpers.

pub mod file;
pub mod files;
pub mod nested;

pub use file::{DiskFile, FileEntity, MemoryFile};
pub use files::{FileStream, Producer};
pub use nested::{flatten, unique, Nested};
