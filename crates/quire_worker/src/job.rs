//! Jobs and their results.

use std::path::PathBuf;
use std::sync::Arc;

use quire_adapter::CompilerConfig;
use quire_common::DependencySet;

use crate::error::JobError;

/// Identifier of a job within one build.
pub type JobId = u64;

/// One design to compile. Consumed exactly once by the pool.
#[derive(Debug, Clone)]
pub struct CompilationJob {
    /// Unique within the build; names the job's working directory.
    pub id: JobId,
    /// Absolute design path.
    pub source_path: PathBuf,
    /// Absolute artifact destination.
    pub output_path: PathBuf,
    /// Shared, read-only compiler options.
    pub config: Arc<CompilerConfig>,
    /// Shared dependency set for the boundary.
    pub dependencies: Arc<DependencySet>,
}

impl CompilationJob {
    /// The job's private working directory.
    pub fn working_dir(&self) -> PathBuf {
        self.config.working_directory.join(format!("job-{}", self.id))
    }
}

/// How a job ended.
#[derive(Debug)]
pub enum JobOutcome {
    /// The artifact is at its destination.
    Success,
    /// The job failed; nothing was written to the destination.
    Failure(JobError),
}

/// Result of one job.
#[derive(Debug)]
pub struct JobResult {
    /// The job this result belongs to.
    pub job_id: JobId,
    /// Design path of the job.
    pub source_path: PathBuf,
    /// Outcome.
    pub outcome: JobOutcome,
}

impl JobResult {
    /// Returns `true` if the job succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, JobOutcome::Success)
    }

    /// The failure cause, if any.
    pub fn error(&self) -> Option<&JobError> {
        match &self.outcome {
            JobOutcome::Success => None,
            JobOutcome::Failure(e) => Some(e),
        }
    }
}
