//! Configuration types deserialized from `quire.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Compiler class used when the configuration does not name one.
///
/// This is the JDT-based compiler as laid out in the 6.x library packages;
/// the version adapter falls back to its 7.x location when it is absent.
pub const DEFAULT_COMPILER: &str = "net.sf.jasperreports.engine.design.JRJdtCompiler";

/// Main class of the JVM launcher started by the default `[worker]` args.
///
/// The launcher is not part of this workspace. It must answer the
/// line-delimited JSON requests described in `quire_worker::protocol`.
pub const DEFAULT_LAUNCHER: &str = "quire.launcher.Main";

/// Dependency set used when the configuration does not declare one.
pub const DEFAULT_DEPENDENCIES: &[&str] = &[
    "net.sf.jasperreports:jasperreports:6.21.0",
    "com.lowagie:itext:2.1.7.js10",
];

/// The top-level project configuration parsed from `quire.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Compile settings shared by every task.
    #[serde(default)]
    pub compile: CompileConfig,
    /// How isolated compiler workers are launched.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Additional named compile tasks, each overriding parts of `[compile]`.
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskOverrides>,
}

/// Core project metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Compile settings for a task, with the plugin's conventional defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Source directory containing report designs, relative to the project root.
    pub source: String,
    /// Output directory for compiled reports, relative to the project root.
    pub output: String,
    /// Extension of report design files, without the dot.
    pub source_extension: String,
    /// Extension of compiled report files, without the dot.
    pub output_extension: String,
    /// Fully qualified compiler class name.
    pub compiler: String,
    /// Validate report designs against the schema before compiling.
    pub validate_xml: bool,
    /// Keep the generated intermediate sources after compiling.
    pub keep_java_file: bool,
    /// Compiler dependency set, as `group:name:version` strings in class path order.
    pub dependencies: Vec<String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            source: "src/main/jasper".to_string(),
            output: "build/reports".to_string(),
            source_extension: "jrxml".to_string(),
            output_extension: "jasper".to_string(),
            compiler: DEFAULT_COMPILER.to_string(),
            validate_xml: true,
            keep_java_file: false,
            dependencies: DEFAULT_DEPENDENCIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Per-task overrides; every unset field inherits from `[compile]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskOverrides {
    /// Overrides [`CompileConfig::source`].
    pub source: Option<String>,
    /// Overrides [`CompileConfig::output`].
    pub output: Option<String>,
    /// Overrides [`CompileConfig::source_extension`].
    pub source_extension: Option<String>,
    /// Overrides [`CompileConfig::output_extension`].
    pub output_extension: Option<String>,
    /// Overrides [`CompileConfig::compiler`].
    pub compiler: Option<String>,
    /// Overrides [`CompileConfig::validate_xml`].
    pub validate_xml: Option<bool>,
    /// Overrides [`CompileConfig::keep_java_file`].
    pub keep_java_file: Option<bool>,
    /// Replaces [`CompileConfig::dependencies`] entirely.
    pub dependencies: Option<Vec<String>>,
}

/// Launch settings for isolated compiler workers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Launcher program (looked up on `PATH` when not a path).
    pub program: String,
    /// Launcher arguments; `{classpath}` is replaced by the resolved class path.
    ///
    /// The launched process is external to quire (by default the JVM class
    /// [`DEFAULT_LAUNCHER`]). It reads one JSON request per line on stdin and
    /// writes one JSON response per line on stdout, following the contract in
    /// `quire_worker::protocol`; `quire-stub-worker` is a reference
    /// implementation.
    pub args: Vec<String>,
    /// Local artifact repository in Maven layout. `~` expands to the home directory.
    pub repository: String,
    /// Maximum number of concurrent workers. Defaults to the available parallelism.
    pub jobs: Option<usize>,
    /// Environment variables passed through to workers; everything else is cleared.
    pub env: Vec<String>,
    /// Directory for snapshot manifests and worker scratch space, relative to the project root.
    pub cache_dir: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            program: "java".to_string(),
            args: vec![
                "-cp".to_string(),
                "{classpath}".to_string(),
                DEFAULT_LAUNCHER.to_string(),
            ],
            repository: "~/.m2/repository".to_string(),
            jobs: None,
            env: vec![
                "PATH".to_string(),
                "JAVA_HOME".to_string(),
                "SYSTEMROOT".to_string(),
            ],
            cache_dir: ".quire-cache".to_string(),
        }
    }
}
