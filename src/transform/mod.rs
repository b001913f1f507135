// src/transform/mod.rs

//! Built-in stream transforms.
//!
//! Each transform takes a [`FileStream`](crate::stream::FileStream) and
//! returns a producer for the next stage; nothing runs until the resulting
//! stream is drained.

pub mod check;
pub mod dest;
pub mod remove;
pub mod rename;

pub use check::{check, CheckOptions, Checker, PatternChecker, Violation};
pub use dest::{dest, target_path};
pub use remove::{remove, remove_path};
pub use rename::{rename, RenameTo};
