//! `quire build`: compile changed designs for the selected tasks.

use std::sync::Arc;

use quire_build::{BuildEvent, BuildRequest, BuildResult};
use quire_worker::{CancelFlag, WorkerPool};

use crate::pipeline::load_project;
use crate::{BuildArgs, GlobalArgs};

/// Runs the `quire build` command.
///
/// Tasks run in order on one shared worker pool. A failing design does not
/// stop the build; all failures are printed at the end. Returns exit code 0
/// when every design compiled, 1 otherwise.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let requests = project.requests(&args.tasks)?;

    if !global.quiet {
        eprintln!("   Building {}", project.config.project.name);
    }

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
            tracing::warn!("cannot install interrupt handler: {e}");
        }
    }

    let jobs = args.jobs.or(project.config.worker.jobs);
    let pool = WorkerPool::new(Arc::new(project.boundary_factory()), jobs, cancel.clone())?;

    let totals = run_tasks(requests, &pool, &cancel, args.force, global)?;
    tracing::debug!(tasks = totals.tasks, failed = totals.failed, "build finished");

    if cancel.is_cancelled() {
        eprintln!("error: build interrupted");
        return Ok(130);
    }
    if totals.failed > 0 {
        eprintln!("error: {} design(s) failed to compile", totals.failed);
        return Ok(1);
    }
    Ok(0)
}

/// What [`run_tasks`] got through.
#[derive(Debug, Default, PartialEq, Eq)]
struct Totals {
    tasks: usize,
    failed: usize,
}

/// Builds each task in order on `pool`. Stops before the next task once
/// `cancel` is set, so an interrupted build does not scan or delete anything
/// further.
fn run_tasks(
    requests: Vec<BuildRequest>,
    pool: &WorkerPool,
    cancel: &CancelFlag,
    force: bool,
    global: &GlobalArgs,
) -> Result<Totals, Box<dyn std::error::Error>> {
    let mut totals = Totals::default();
    for request in requests {
        if cancel.is_cancelled() {
            tracing::debug!(task = %request.task.name, "interrupted, skipping task");
            break;
        }
        let request = request.force(force);
        if !global.quiet {
            eprintln!("       Task {}", request.task.name);
        }

        let report = quire_build::compile_with(&request, pool, &mut |event| {
            print_event(event, global)
        })?;
        totals.tasks += 1;

        if let BuildResult::Failure(ref failures) = report.result {
            for failure in failures {
                eprintln!("error: {failure}");
            }
            totals.failed += failures.len();
        }
        if !global.quiet {
            let s = report.summary;
            eprintln!(
                "   Finished {}: {} compiled, {} removed, {} up to date, {} failed",
                request.task.name, s.compiled, s.removed, s.unchanged, s.failed
            );
        }
    }
    Ok(totals)
}

fn print_event(event: BuildEvent<'_>, global: &GlobalArgs) {
    if global.quiet {
        return;
    }
    match event {
        BuildEvent::Compiling(path) => eprintln!("  Compiling {}", path.display()),
        BuildEvent::Removed(path) => eprintln!("    Removed {}", path.display()),
        BuildEvent::Compiled(path) if global.verbose => eprintln!("   Compiled {}", path.display()),
        BuildEvent::Compiled(_) | BuildEvent::Failed(..) => {}
    }
}
