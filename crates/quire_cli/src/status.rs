//! `quire status`: show pending changes without compiling.

use quire_cache::ChangeKind;

use crate::pipeline::load_project;
use crate::{GlobalArgs, TaskArgs};

/// Runs the `quire status` command.
///
/// Prints one line per added, modified or removed design to stdout. Returns
/// exit code 0.
pub fn run(args: &TaskArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;

    for request in project.requests(&args.tasks)? {
        let changes = quire_build::status(&request)?;
        if !global.quiet {
            eprintln!("       Task {}", request.task.name);
        }
        if changes.is_empty() {
            if !global.quiet {
                eprintln!("   Up to date ({} designs)", changes.count(ChangeKind::Unchanged));
            }
            continue;
        }
        for record in changes.records.iter().filter(|r| r.kind != ChangeKind::Unchanged) {
            println!("{:>10} {}", record.kind, record.path.display());
        }
    }
    Ok(0)
}
