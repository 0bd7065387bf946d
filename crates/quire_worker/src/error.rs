//! Error types for boundaries, jobs and the pool.

use std::path::PathBuf;

use quire_adapter::{AdapterError, ProbeError};
use quire_common::ArtifactLocator;

/// Failures talking to an isolation boundary.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    /// The launcher could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        /// The configured launcher program.
        program: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A dependency is not present in the local repository.
    #[error("dependency {locator} not found at {}", .path.display())]
    MissingArchive {
        /// The unresolved dependency.
        locator: ArtifactLocator,
        /// Where it was expected.
        path: PathBuf,
    },

    /// Reading or writing the launcher's pipes failed.
    #[error("boundary I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The launcher sent something that is not a valid response, or exited.
    #[error("boundary protocol error: {0}")]
    Protocol(String),

    /// The compiler rejected the design.
    #[error("{message}")]
    Rejected {
        /// Diagnostic from the compiler.
        message: String,
    },

    /// The launcher reported an internal failure.
    #[error("worker error: {message}")]
    Worker {
        /// Diagnostic from the launcher.
        message: String,
    },
}

impl From<BoundaryError> for ProbeError {
    fn from(err: BoundaryError) -> Self {
        ProbeError::new(err.to_string())
    }
}

/// Why a single compilation job failed.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The compiler rejected the design.
    #[error("compilation failed: {message}")]
    Compilation {
        /// Diagnostic from the compiler.
        message: String,
    },

    /// Moving the artifact into place or preparing its directory failed.
    #[error("cannot write {}: {source}", .path.display())]
    OutputWrite {
        /// Path being written.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The boundary could not be opened or broke protocol.
    #[error(transparent)]
    Boundary(BoundaryError),

    /// The compiler entry point or keys could not be resolved.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// The compile call reported success but produced no artifact.
    #[error("compiler produced no artifact at {}", .0.display())]
    MissingArtifact(PathBuf),

    /// The build was cancelled before this job started.
    #[error("cancelled")]
    Cancelled,

    /// The job panicked.
    #[error("job panicked: {0}")]
    Panicked(String),
}

impl From<BoundaryError> for JobError {
    fn from(err: BoundaryError) -> Self {
        match err {
            BoundaryError::Rejected { message } => JobError::Compilation { message },
            other => JobError::Boundary(other),
        }
    }
}

/// Failures setting up the pool itself.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The thread pool could not be built.
    #[error("cannot start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_becomes_compilation_failure() {
        let err: JobError = BoundaryError::Rejected {
            message: "line 3: unknown element".to_string(),
        }
        .into();
        assert!(matches!(err, JobError::Compilation { .. }));
        assert_eq!(err.to_string(), "compilation failed: line 3: unknown element");
    }

    #[test]
    fn other_boundary_errors_stay_boundary() {
        let err: JobError = BoundaryError::Protocol("eof".to_string()).into();
        assert!(matches!(err, JobError::Boundary(_)));
    }

    #[test]
    fn missing_archive_names_locator() {
        let err = BoundaryError::MissingArchive {
            locator: "com.lowagie:itext:2.1.7.js10".parse().unwrap(),
            path: PathBuf::from("/repo/com/lowagie/itext/2.1.7.js10/itext-2.1.7.js10.jar"),
        };
        assert!(err.to_string().contains("com.lowagie:itext:2.1.7.js10"));
    }
}
