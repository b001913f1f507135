// src/config/mod.rs

//! TOML build files: model, loading, validation and task construction.

pub mod definition;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_build_file, load_and_validate, parse_and_validate};
pub use model::{BuildFile, Patterns, RawBuildFile, StepConfig, TaskConfig};
