//! Build results and progress events.

use std::fmt;
use std::path::{Path, PathBuf};

use quire_worker::JobError;

/// A file that could not be compiled or removed.
#[derive(Debug)]
pub struct FileFailure {
    /// Path relative to the source root.
    pub path: PathBuf,
    /// What went wrong.
    pub cause: JobError,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.cause)
    }
}

/// Overall outcome of one task's build.
#[derive(Debug)]
pub enum BuildResult {
    /// Every dispatched job and removal succeeded.
    Success,
    /// At least one file failed. All of them are listed, in path order.
    Failure(Vec<FileFailure>),
}

impl BuildResult {
    /// Returns `true` for [`BuildResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, BuildResult::Success)
    }
}

/// Counts for the summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Designs whose artifact was (re)written.
    pub compiled: usize,
    /// Artifacts deleted because their design is gone.
    pub removed: usize,
    /// Designs skipped as up to date.
    pub unchanged: usize,
    /// Designs that failed to compile or whose artifact could not be removed.
    pub failed: usize,
}

/// Result plus counts.
#[derive(Debug)]
pub struct BuildReport {
    /// Success, or every failure in path order.
    pub result: BuildResult,
    /// Per-kind counts.
    pub summary: BuildSummary,
}

/// Progress notification, delivered on the calling thread.
#[derive(Debug, Clone, Copy)]
pub enum BuildEvent<'a> {
    /// A job was submitted for this design.
    Compiling(&'a Path),
    /// The design's artifact is in place.
    Compiled(&'a Path),
    /// The design's artifact was deleted.
    Removed(&'a Path),
    /// Compiling or removing the design failed.
    Failed(&'a Path, &'a JobError),
}
