//! The build procedure for one task.

use std::io;
use std::path::Path;
use std::sync::Arc;

use quire_cache::{Cache, ChangeKind, ChangeRecord, ChangeSet};
use quire_worker::{BoundaryFactory, CancelFlag, CompilationJob, JobError, JobHandle, JobOutcome, WorkerPool};

use crate::error::BuildError;
use crate::request::{BuildRequest, QUIRE_VERSION};
use crate::result::{BuildEvent, BuildReport, BuildResult, BuildSummary, FileFailure};

/// Builds one task with a fresh pool over `factory`.
///
/// The pool uses one thread per available core; use [`compile_with`] to
/// share a pool across tasks or to observe progress.
pub fn compile(
    request: &BuildRequest,
    factory: Arc<dyn BoundaryFactory>,
    cancel: CancelFlag,
) -> Result<BuildReport, BuildError> {
    let pool = WorkerPool::new(factory, None, cancel)?;
    compile_with(request, &pool, &mut |_| {})
}

/// Builds one task on `pool`, reporting progress through `on_event`.
///
/// Removals run on the calling thread before any job is awaited. The call
/// returns only after every submitted job has finished. The snapshot is
/// saved with successful and unchanged designs; failed designs are left out
/// so the next build retries them.
pub fn compile_with(
    request: &BuildRequest,
    pool: &WorkerPool,
    on_event: &mut dyn FnMut(BuildEvent<'_>),
) -> Result<BuildReport, BuildError> {
    let layout = request.layout();
    let config = Arc::new(request.compiler_config());
    let dependencies = Arc::new(request.task.dependencies.clone());
    let fingerprint = config.fingerprint(&dependencies);

    let mut cache = if request.force {
        Cache::fresh(&request.cache_dir, QUIRE_VERSION, fingerprint)
    } else {
        Cache::load_or_create(&request.cache_dir, QUIRE_VERSION, fingerprint)
    };
    let changes = cache.detect_changes(&layout)?;
    tracing::info!(
        task = %request.task.name,
        dirty = changes.dirty_count(),
        removed = changes.count(ChangeKind::Removed),
        "changes detected"
    );

    let mut summary = BuildSummary {
        unchanged: changes.count(ChangeKind::Unchanged),
        ..BuildSummary::default()
    };
    let mut failures = Vec::new();

    for record in changes.removed() {
        match remove_output(&record.output_path, &layout.output_root) {
            Ok(()) => {
                cache.forget(&record.path);
                summary.removed += 1;
                on_event(BuildEvent::Removed(&record.path));
            }
            Err(source) => {
                let cause = JobError::OutputWrite {
                    path: record.output_path.clone(),
                    source,
                };
                on_event(BuildEvent::Failed(&record.path, &cause));
                failures.push(FileFailure {
                    path: record.path.clone(),
                    cause,
                });
            }
        }
    }

    let mut pending: Vec<(&ChangeRecord, JobHandle)> = Vec::new();
    for (id, record) in changes.dirty().enumerate() {
        if let Some(stale) = &record.stale_output {
            if let Err(source) = remove_output(stale, &layout.output_root) {
                let cause = JobError::OutputWrite {
                    path: stale.clone(),
                    source,
                };
                on_event(BuildEvent::Failed(&record.path, &cause));
                failures.push(FileFailure {
                    path: record.path.clone(),
                    cause,
                });
                continue;
            }
            tracing::debug!(stale = %stale.display(), "removed artifact at previous path");
        }
        if let Some(parent) = record.output_path.parent() {
            if let Err(source) = std::fs::create_dir_all(parent) {
                let cause = JobError::OutputWrite {
                    path: parent.to_path_buf(),
                    source,
                };
                on_event(BuildEvent::Failed(&record.path, &cause));
                cache.forget(&record.path);
                failures.push(FileFailure {
                    path: record.path.clone(),
                    cause,
                });
                continue;
            }
        }
        let job = CompilationJob {
            id: id as u64,
            source_path: record.source_path.clone(),
            output_path: record.output_path.clone(),
            config: Arc::clone(&config),
            dependencies: Arc::clone(&dependencies),
        };
        on_event(BuildEvent::Compiling(&record.path));
        pending.push((record, pool.submit(job)));
    }

    for (record, handle) in pending {
        let result = handle.wait();
        match result.outcome {
            JobOutcome::Success => {
                if let (Some(hash), Some(output)) =
                    (record.content_hash, layout.mapper.map(&record.path))
                {
                    cache.record_compiled(&record.path, hash, output);
                }
                summary.compiled += 1;
                on_event(BuildEvent::Compiled(&record.path));
            }
            JobOutcome::Failure(cause) => {
                cache.forget(&record.path);
                on_event(BuildEvent::Failed(&record.path, &cause));
                failures.push(FileFailure {
                    path: record.path.clone(),
                    cause,
                });
            }
        }
    }

    cache.save()?;

    summary.failed = failures.len();
    failures.sort_by(|a, b| a.path.cmp(&b.path));
    let result = if failures.is_empty() {
        BuildResult::Success
    } else {
        BuildResult::Failure(failures)
    };
    Ok(BuildReport { result, summary })
}

/// Classifies the task's designs without compiling anything.
pub fn status(request: &BuildRequest) -> Result<ChangeSet, BuildError> {
    let config = request.compiler_config();
    let fingerprint = config.fingerprint(&request.task.dependencies);
    let cache = if request.force {
        Cache::fresh(&request.cache_dir, QUIRE_VERSION, fingerprint)
    } else {
        Cache::load_or_create(&request.cache_dir, QUIRE_VERSION, fingerprint)
    };
    Ok(cache.detect_changes(&request.layout())?)
}

/// Deletes the task's output tree, snapshot, and job directories.
pub fn clean(request: &BuildRequest) -> Result<(), BuildError> {
    remove_dir_if_present(&request.task.output_dir)?;
    remove_dir_if_present(&request.working_dir)?;
    Cache::clear(&request.cache_dir)?;
    Ok(())
}

fn remove_dir_if_present(dir: &Path) -> Result<(), BuildError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BuildError::Clean {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Deletes `output` if present, then prunes directories under `root` that
/// were left empty.
fn remove_output(output: &Path, root: &Path) -> io::Result<()> {
    match std::fs::remove_file(output) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    let mut dir = output.parent();
    while let Some(d) = dir {
        if d == root || !d.starts_with(root) {
            break;
        }
        // Fails on non-empty or missing directories, which ends the walk.
        if std::fs::remove_dir(d).is_err() {
            break;
        }
        dir = d.parent();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn remove_output_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a.jasper");
        fs::write(&out, b"x").unwrap();
        remove_output(&out, dir.path()).unwrap();
        remove_output(&out, dir.path()).unwrap();
        assert!(!out.exists());
        assert!(dir.path().is_dir());
    }

    #[test]
    fn remove_output_prunes_empty_parents_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("out");
        fs::create_dir_all(root.join("sales/2024")).unwrap();
        fs::write(root.join("sales/summary.jasper"), b"x").unwrap();
        let target = root.join("sales/2024/q1.jasper");
        fs::write(&target, b"x").unwrap();

        remove_output(&target, &root).unwrap();
        assert!(!root.join("sales/2024").exists());
        assert!(root.join("sales/summary.jasper").is_file());

        remove_output(&root.join("sales/summary.jasper"), &root).unwrap();
        assert!(!root.join("sales").exists());
        assert!(root.is_dir());
    }
}
