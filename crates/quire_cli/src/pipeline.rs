//! Shared helpers for CLI commands: project root resolution, config loading,
//! task selection, and logging setup.

use std::path::{Path, PathBuf};

use quire_build::BuildRequest;
use quire_config::{resolve_all_tasks, resolve_task, ProjectConfig, CONFIG_FILE};
use quire_worker::{LocalRepository, ProcessBoundaryFactory};

use crate::GlobalArgs;

/// A loaded project.
pub struct Project {
    /// Directory holding the configuration file.
    pub root: PathBuf,
    /// The parsed configuration.
    pub config: ProjectConfig,
}

impl Project {
    /// Root of all per-task snapshot directories.
    pub fn cache_root(&self) -> PathBuf {
        self.root.join(&self.config.worker.cache_dir)
    }

    /// Resolves the named tasks in order, or every task when `names` is empty.
    pub fn requests(&self, names: &[String]) -> Result<Vec<BuildRequest>, Box<dyn std::error::Error>> {
        let tasks = if names.is_empty() {
            resolve_all_tasks(&self.config, &self.root)?
        } else {
            names
                .iter()
                .map(|name| resolve_task(&self.config, name, &self.root))
                .collect::<Result<Vec<_>, _>>()?
        };
        let cache_root = self.cache_root();
        Ok(tasks
            .into_iter()
            .map(|task| BuildRequest::for_task(task, &cache_root))
            .collect())
    }

    /// A process boundary factory for the configured launcher.
    pub fn boundary_factory(&self) -> ProcessBoundaryFactory {
        let worker = &self.config.worker;
        ProcessBoundaryFactory::new(
            worker.program.clone(),
            worker.args.clone(),
            LocalRepository::from_config_path(&worker.repository),
        )
        .with_env_allow(worker.env.clone())
    }
}

/// Walks up from `start` looking for the nearest directory containing `quire.toml`.
///
/// Returns the directory containing `quire.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Finds and loads the project.
///
/// If `--config` names a file, that file is loaded and its directory is the
/// project root. If it names a directory, `quire.toml` inside it is loaded.
/// Otherwise walks up from the current directory.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    let (root, file) = match global.config {
        Some(ref config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                let root = p
                    .parent()
                    .filter(|d| !d.as_os_str().is_empty())
                    .map(|d| d.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."));
                (root, p)
            } else {
                (p.clone(), p.join(CONFIG_FILE))
            }
        }
        None => {
            let root = find_project_root(&std::env::current_dir()?)?;
            let file = root.join(CONFIG_FILE);
            (root, file)
        }
    };
    let content = std::fs::read_to_string(&file)
        .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    let config = quire_config::load_config_from_str(&content)?;
    Ok(Project { root, config })
}

/// Installs the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `--verbose` enables debug events from
/// the quire crates, and everything else shows warnings only (errors under
/// `--quiet`).
pub fn init_tracing(global: &GlobalArgs) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if global.verbose {
        "warn,quire_cache=debug,quire_adapter=debug,quire_worker=debug,quire_build=debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(global.verbose))
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MINIMAL: &str = "[project]\nname = \"invoices\"\n";

    fn global(config: Option<String>) -> GlobalArgs {
        GlobalArgs {
            quiet: false,
            verbose: false,
            config,
        }
    }

    #[test]
    fn find_project_root_in_current_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), MINIMAL).unwrap();
        assert_eq!(find_project_root(tmp.path()).unwrap(), tmp.path());
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), MINIMAL).unwrap();
        let nested = tmp.path().join("src/main/jasper");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_project_root(&nested).unwrap(), tmp.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = find_project_root(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("could not find quire.toml"));
    }

    #[test]
    fn load_project_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("reports.toml");
        fs::write(&path, MINIMAL).unwrap();
        let project = load_project(&global(Some(path.to_str().unwrap().to_string()))).unwrap();
        assert_eq!(project.root, tmp.path());
        assert_eq!(project.config.project.name, "invoices");
    }

    #[test]
    fn load_project_from_config_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), MINIMAL).unwrap();
        let project = load_project(&global(Some(tmp.path().to_str().unwrap().to_string()))).unwrap();
        assert_eq!(project.root, tmp.path());
    }

    #[test]
    fn requests_default_to_every_task() {
        let tmp = TempDir::new().unwrap();
        let config = quire_config::load_config_from_str(
            "[project]\nname = \"x\"\n\n[tasks.legacy]\nsource = \"src/legacy\"\noutput = \"build/legacy\"\n",
        )
        .unwrap();
        let project = Project {
            root: tmp.path().to_path_buf(),
            config,
        };

        let all = project.requests(&[]).unwrap();
        let names: Vec<_> = all.iter().map(|r| r.task.name.as_str()).collect();
        assert_eq!(names, vec!["compileJasper", "legacy"]);
        assert_eq!(all[1].cache_dir, tmp.path().join(".quire-cache/legacy"));

        let one = project.requests(&["legacy".to_string()]).unwrap();
        assert_eq!(one.len(), 1);
        assert!(project.requests(&["nope".to_string()]).is_err());
    }
}
