//! What to build.

use std::path::{Path, PathBuf};

use quire_adapter::CompilerConfig;
use quire_cache::{PathMapper, TreeLayout};
use quire_config::ResolvedTask;

/// Tool version recorded in every snapshot.
pub const QUIRE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One task's build inputs.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// The resolved task.
    pub task: ResolvedTask,
    /// Where this task's snapshot lives.
    pub cache_dir: PathBuf,
    /// Parent of the per-job working directories.
    pub working_dir: PathBuf,
    /// Ignore the snapshot and recompile everything.
    pub force: bool,
}

impl BuildRequest {
    /// Places the snapshot in `<cache_root>/<task>` and job directories
    /// under its `work` subdirectory.
    pub fn for_task(task: ResolvedTask, cache_root: &Path) -> Self {
        let cache_dir = cache_root.join(&task.name);
        let working_dir = cache_dir.join("work");
        Self {
            task,
            cache_dir,
            working_dir,
            force: false,
        }
    }

    /// Sets the force flag.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Source and output roots with the task's extension pair.
    pub fn layout(&self) -> TreeLayout {
        TreeLayout::new(
            self.task.source_dir.clone(),
            self.task.output_dir.clone(),
            PathMapper::new(&self.task.source_extension, &self.task.output_extension),
        )
    }

    /// Compiler options shared by every job of the build.
    pub fn compiler_config(&self) -> CompilerConfig {
        CompilerConfig {
            compiler_identifier: self.task.compiler.clone(),
            validate_input: self.task.validate_xml,
            retain_intermediate_artifacts: self.task.keep_java_file,
            working_directory: self.working_dir.clone(),
        }
    }
}
