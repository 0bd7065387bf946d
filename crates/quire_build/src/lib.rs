//! Compilation orchestrator.
//!
//! Ties change detection, the worker pool and the snapshot together: every
//! added or modified design becomes a job, every removed design loses its
//! artifact, and the snapshot is updated with what actually succeeded. Builds
//! are fail-slow; all failures are collected and reported together.

#![warn(missing_docs)]

pub mod error;
pub mod orchestrator;
pub mod request;
pub mod result;

pub use error::BuildError;
pub use orchestrator::{clean, compile, compile_with, status};
pub use request::{BuildRequest, QUIRE_VERSION};
pub use result::{BuildEvent, BuildReport, BuildResult, BuildSummary, FileFailure};
