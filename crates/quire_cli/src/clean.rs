//! `quire clean`: remove outputs and snapshots.

use crate::pipeline::load_project;
use crate::{GlobalArgs, TaskArgs};

/// Runs the `quire clean` command. Returns exit code 0.
pub fn run(args: &TaskArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;

    for request in project.requests(&args.tasks)? {
        quire_build::clean(&request)?;
        if !global.quiet {
            eprintln!(
                "    Cleaned {} ({})",
                request.task.name,
                request.task.output_dir.display()
            );
        }
    }
    Ok(0)
}
