//! Task resolution: merging the shared `[compile]` section with task overrides.

use crate::error::ConfigError;
use crate::types::{CompileConfig, ProjectConfig, TaskOverrides};
use quire_common::DependencySet;
use std::path::{Path, PathBuf};

/// Name of the task built from `[compile]` alone. Always present.
pub const DEFAULT_TASK: &str = "compileJasper";

/// A fully resolved compile task with absolute directories and a parsed
/// dependency set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTask {
    /// The task name.
    pub name: String,
    /// Absolute source directory.
    pub source_dir: PathBuf,
    /// Absolute output directory.
    pub output_dir: PathBuf,
    /// Extension of report design files, without the dot.
    pub source_extension: String,
    /// Extension of compiled report files, without the dot.
    pub output_extension: String,
    /// Fully qualified compiler class name as configured.
    pub compiler: String,
    /// Whether schema validation is requested.
    pub validate_xml: bool,
    /// Whether generated intermediate sources are kept.
    pub keep_java_file: bool,
    /// The compiler dependency set, deduplicated, in class path order.
    pub dependencies: DependencySet,
}

/// Applies task overrides on top of the shared compile settings.
pub(crate) fn merge(base: &CompileConfig, overrides: &TaskOverrides) -> CompileConfig {
    CompileConfig {
        source: overrides.source.clone().unwrap_or_else(|| base.source.clone()),
        output: overrides.output.clone().unwrap_or_else(|| base.output.clone()),
        source_extension: overrides
            .source_extension
            .clone()
            .unwrap_or_else(|| base.source_extension.clone()),
        output_extension: overrides
            .output_extension
            .clone()
            .unwrap_or_else(|| base.output_extension.clone()),
        compiler: overrides
            .compiler
            .clone()
            .unwrap_or_else(|| base.compiler.clone()),
        validate_xml: overrides.validate_xml.unwrap_or(base.validate_xml),
        keep_java_file: overrides.keep_java_file.unwrap_or(base.keep_java_file),
        dependencies: overrides
            .dependencies
            .clone()
            .unwrap_or_else(|| base.dependencies.clone()),
    }
}

/// Resolves a named task against the project root.
///
/// [`DEFAULT_TASK`] resolves from `[compile]` unless `[tasks.compileJasper]`
/// overrides it; any other name must be declared under `[tasks]`.
pub fn resolve_task(
    config: &ProjectConfig,
    task_name: &str,
    project_dir: &Path,
) -> Result<ResolvedTask, ConfigError> {
    let merged = match config.tasks.get(task_name) {
        Some(overrides) => merge(&config.compile, overrides),
        None if task_name == DEFAULT_TASK => config.compile.clone(),
        None => return Err(ConfigError::UnknownTask(task_name.to_string())),
    };

    let dependencies = DependencySet::parse_all(&merged.dependencies)
        .map_err(|e| ConfigError::ValidationError(format!("tasks.{task_name}.dependencies: {e}")))?;

    Ok(ResolvedTask {
        name: task_name.to_string(),
        source_dir: project_dir.join(&merged.source),
        output_dir: project_dir.join(&merged.output),
        source_extension: merged.source_extension,
        output_extension: merged.output_extension,
        compiler: merged.compiler,
        validate_xml: merged.validate_xml,
        keep_java_file: merged.keep_java_file,
        dependencies,
    })
}

/// Resolves every task: the default task first, then declared tasks by name.
pub fn resolve_all_tasks(
    config: &ProjectConfig,
    project_dir: &Path,
) -> Result<Vec<ResolvedTask>, ConfigError> {
    let mut names = vec![DEFAULT_TASK];
    names.extend(
        config
            .tasks
            .keys()
            .map(|s| s.as_str())
            .filter(|n| *n != DEFAULT_TASK),
    );
    names
        .into_iter()
        .map(|name| resolve_task(config, name, project_dir))
        .collect()
}
