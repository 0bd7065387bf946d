//! Invocation-level failures.
//!
//! Per-file problems never show up here; they are collected in
//! [`BuildResult::Failure`](crate::BuildResult::Failure).

use std::path::PathBuf;

use quire_cache::{CacheError, DetectionError};
use quire_worker::WorkerError;

/// Errors that abort a whole build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The source tree could not be scanned; nothing was compiled.
    #[error(transparent)]
    Detection(#[from] DetectionError),

    /// The snapshot could not be written.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The worker pool could not be started.
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// A directory owned by the build could not be removed.
    #[error("cannot remove {}: {source}", .path.display())]
    Clean {
        /// The directory.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}
