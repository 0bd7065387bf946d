//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{CompileConfig, ProjectConfig, TaskOverrides};
use quire_common::DependencySet;
use std::path::Path;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "quire.toml";

/// Loads and validates a `quire.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `quire.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.worker.program.is_empty() {
        return Err(ConfigError::MissingField("worker.program".to_string()));
    }
    if config.worker.jobs == Some(0) {
        return Err(ConfigError::ValidationError(
            "worker.jobs must be at least 1".to_string(),
        ));
    }

    validate_compile("compile", &config.compile)?;
    for (name, overrides) in &config.tasks {
        if name.is_empty() {
            return Err(ConfigError::ValidationError(
                "task names must not be empty".to_string(),
            ));
        }
        validate_overrides(name, overrides, &config.compile)?;
    }
    Ok(())
}

fn validate_compile(section: &str, compile: &CompileConfig) -> Result<(), ConfigError> {
    for (field, value) in [
        ("source", &compile.source),
        ("output", &compile.output),
        ("source_extension", &compile.source_extension),
        ("output_extension", &compile.output_extension),
        ("compiler", &compile.compiler),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!("{section}.{field}")));
        }
    }
    if compile.source_extension == compile.output_extension {
        return Err(ConfigError::ValidationError(format!(
            "{section}: source and output extensions must differ (both '{}')",
            compile.source_extension
        )));
    }
    if compile.source == compile.output {
        return Err(ConfigError::ValidationError(format!(
            "{section}: source and output directories must differ (both '{}')",
            compile.source
        )));
    }
    DependencySet::parse_all(&compile.dependencies)
        .map_err(|e| ConfigError::ValidationError(format!("{section}.dependencies: {e}")))?;
    Ok(())
}

fn validate_overrides(
    name: &str,
    overrides: &TaskOverrides,
    base: &CompileConfig,
) -> Result<(), ConfigError> {
    let merged = crate::resolve::merge(base, overrides);
    validate_compile(&format!("tasks.{name}"), &merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "invoices"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "invoices");
        assert_eq!(config.compile.source, "src/main/jasper");
        assert!(config.tasks.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "invoices"
description = "Customer invoice layouts"

[compile]
source = "reports"
output = "target/reports"
validate_xml = false
keep_java_file = true
dependencies = ["net.sf.jasperreports:jasperreports:7.0.1", "net.sf.jasperreports:jasperreports-jdt:7.0.1"]

[worker]
program = "/opt/jdk/bin/java"
args = ["-Xmx512m", "-cp", "{classpath}", "quire.launcher.Main"]
repository = "/var/cache/m2"
jobs = 2
env = ["PATH"]

[tasks.legacy]
source = "legacy"
output = "target/legacy"
dependencies = ["net.sf.jasperreports:jasperreports:6.20.0"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.description, "Customer invoice layouts");
        assert_eq!(config.compile.source, "reports");
        assert!(!config.compile.validate_xml);
        assert!(config.compile.keep_java_file);
        assert_eq!(config.compile.dependencies.len(), 2);
        assert_eq!(config.worker.jobs, Some(2));
        assert_eq!(config.worker.args[0], "-Xmx512m");
        assert!(config.tasks.contains_key("legacy"));
    }

    #[test]
    fn missing_name_errors() {
        let toml = r#"
[project]
name = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn same_extensions_rejected() {
        let toml = r#"
[project]
name = "x"

[compile]
output_extension = "jrxml"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn malformed_dependency_rejected() {
        let toml = r#"
[project]
name = "x"

[tasks.broken]
dependencies = ["jasperreports-6.20.0"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        match err {
            ConfigError::ValidationError(msg) => assert!(msg.contains("tasks.broken")),
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn zero_jobs_rejected() {
        let toml = r#"
[project]
name = "x"

[worker]
jobs = 0
"#;
        assert!(matches!(
            load_config_from_str(toml).unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[project]\nname = \"disk\"\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.project.name, "disk");
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
