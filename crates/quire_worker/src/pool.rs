//! Bounded parallel execution of compilation jobs.
//!
//! Jobs run on a dedicated rayon pool. Each job opens its own boundary, plans
//! the invocation against it, compiles into a private working directory and
//! only then moves the artifact to its destination. Whatever goes wrong,
//! including a panic, is captured in the job's [`JobResult`].

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver};
use quire_adapter::plan_invocation;

use crate::boundary::{BoundaryFactory, BoundaryProbe};
use crate::error::{JobError, WorkerError};
use crate::job::{CompilationJob, JobId, JobOutcome, JobResult};
use crate::protocol::CompileRequest;

/// Shared cancellation signal for a build.
///
/// Jobs that have not started when the flag is set finish as
/// [`JobError::Cancelled`]; running jobs are left to complete.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that is not set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle to a submitted job.
pub struct JobHandle {
    job_id: JobId,
    source_path: std::path::PathBuf,
    rx: Receiver<JobResult>,
}

impl JobHandle {
    /// Id of the submitted job.
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Blocks until the job finishes.
    pub fn wait(self) -> JobResult {
        self.rx.recv().unwrap_or_else(|_| JobResult {
            job_id: self.job_id,
            source_path: self.source_path,
            outcome: JobOutcome::Failure(JobError::Panicked(
                "worker thread exited without a result".to_string(),
            )),
        })
    }
}

/// Runs jobs in parallel, bounded by the pool size.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    factory: Arc<dyn BoundaryFactory>,
    cancel: CancelFlag,
}

impl WorkerPool {
    /// Starts a pool of `jobs` threads, or one per available core.
    pub fn new(
        factory: Arc<dyn BoundaryFactory>,
        jobs: Option<usize>,
        cancel: CancelFlag,
    ) -> Result<Self, WorkerError> {
        let threads = jobs.unwrap_or(0);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("quire-worker-{i}"))
            .build()?;
        tracing::debug!(threads = pool.current_num_threads(), "worker pool started");
        Ok(Self {
            pool,
            factory,
            cancel,
        })
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Queues a job and returns a handle to its result.
    pub fn submit(&self, job: CompilationJob) -> JobHandle {
        let (tx, rx) = channel::bounded(1);
        let handle = JobHandle {
            job_id: job.id,
            source_path: job.source_path.clone(),
            rx,
        };
        let factory = Arc::clone(&self.factory);
        let cancel = self.cancel.clone();
        self.pool.spawn(move || {
            let result = run_job(factory.as_ref(), &cancel, job);
            let _ = tx.send(result);
        });
        handle
    }

    /// Submits every job and waits for all of them. Results come back in
    /// submission order.
    pub fn run_all(&self, jobs: Vec<CompilationJob>) -> Vec<JobResult> {
        let handles: Vec<JobHandle> = jobs.into_iter().map(|job| self.submit(job)).collect();
        handles.into_iter().map(JobHandle::wait).collect()
    }
}

/// Runs one job to completion, never panicking.
fn run_job(factory: &dyn BoundaryFactory, cancel: &CancelFlag, job: CompilationJob) -> JobResult {
    let outcome = if cancel.is_cancelled() {
        tracing::debug!(job = job.id, "cancelled before start");
        JobOutcome::Failure(JobError::Cancelled)
    } else {
        let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| execute(factory, &job)));
        match caught {
            Ok(Ok(())) => JobOutcome::Success,
            Ok(Err(e)) => JobOutcome::Failure(e),
            Err(panic_info) => {
                let msg = if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                    (*s).to_string()
                } else {
                    "unknown panic payload".to_string()
                };
                JobOutcome::Failure(JobError::Panicked(msg))
            }
        }
    };

    match &outcome {
        JobOutcome::Success => tracing::info!(job = job.id, source = %job.source_path.display(), "compiled"),
        JobOutcome::Failure(e) => {
            tracing::info!(job = job.id, source = %job.source_path.display(), error = %e, "failed")
        }
    }
    JobResult {
        job_id: job.id,
        source_path: job.source_path,
        outcome,
    }
}

fn execute(factory: &dyn BoundaryFactory, job: &CompilationJob) -> Result<(), JobError> {
    let workdir = job.working_dir();
    if workdir.exists() {
        std::fs::remove_dir_all(&workdir).map_err(|source| JobError::OutputWrite {
            path: workdir.clone(),
            source,
        })?;
    }
    std::fs::create_dir_all(&workdir).map_err(|source| JobError::OutputWrite {
        path: workdir.clone(),
        source,
    })?;

    let result = compile_in(factory, job, &workdir);

    if !job.config.retain_intermediate_artifacts {
        if let Err(e) = std::fs::remove_dir_all(&workdir) {
            tracing::warn!("cannot remove {}: {e}", workdir.display());
        }
    }
    result
}

fn compile_in(factory: &dyn BoundaryFactory, job: &CompilationJob, workdir: &Path) -> Result<(), JobError> {
    let mut boundary = factory.open(&job.dependencies, workdir)?;
    let plan = plan_invocation(&mut BoundaryProbe(boundary.as_mut()), &job.config, workdir)?;

    let file_name = job
        .output_path
        .file_name()
        .ok_or_else(|| JobError::MissingArtifact(job.output_path.clone()))?;
    let staged = workdir.join(file_name);
    boundary.compile(&CompileRequest {
        source: job.source_path.clone(),
        destination: staged.clone(),
        compiler: plan.compiler,
        properties: plan.properties,
    })?;
    boundary.close()?;

    if !staged.is_file() {
        return Err(JobError::MissingArtifact(staged));
    }
    install(&staged, &job.output_path)
}

/// Moves `staged` to `dest`. Falls back to copy-then-rename across
/// filesystems so `dest` never holds a partial file.
fn install(staged: &Path, dest: &Path) -> Result<(), JobError> {
    let write_err = |source| JobError::OutputWrite {
        path: dest.to_path_buf(),
        source,
    };
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    if std::fs::rename(staged, dest).is_ok() {
        return Ok(());
    }
    let name = dest.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let tmp = dest.with_file_name(format!(".{name}.quire-tmp"));
    copy_into_place(staged, &tmp, dest).map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        write_err(source)
    })
}

fn copy_into_place(staged: &Path, tmp: &Path, dest: &Path) -> std::io::Result<()> {
    std::fs::copy(staged, tmp)?;
    std::fs::rename(tmp, dest)
}
