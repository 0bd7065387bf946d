//! Parsing and validation of `quire.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a strongly-typed
//! [`ProjectConfig`], with per-task resolution of compile settings and the
//! compiler dependency set.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_all_tasks, resolve_task, ResolvedTask, DEFAULT_TASK};
pub use types::*;
