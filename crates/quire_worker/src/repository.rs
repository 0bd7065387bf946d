//! Local artifact repository lookup.
//!
//! Dependencies are never downloaded. They must already exist in a local
//! repository using the Maven directory layout:
//! `<root>/<group as path>/<name>/<version>/<name>-<version>.jar`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use quire_common::{ArtifactLocator, DependencySet};

use crate::error::BoundaryError;

/// A directory of archives in Maven layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    /// Uses `root` as-is.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Builds a repository from a configured path, expanding a leading `~`
    /// to the user's home directory.
    pub fn from_config_path(path: &str) -> Self {
        let expanded = match path.strip_prefix('~') {
            Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => {
                match BaseDirs::new() {
                    Some(dirs) => dirs.home_dir().join(rest.trim_start_matches(|c: char| c == '/' || c == '\\')),
                    None => {
                        tracing::warn!("cannot determine home directory, using '{path}' literally");
                        PathBuf::from(path)
                    }
                }
            }
            _ => PathBuf::from(path),
        };
        Self::new(expanded)
    }

    /// Repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the archive for `locator` lives.
    pub fn archive_path(&self, locator: &ArtifactLocator) -> PathBuf {
        let mut path = self.root.clone();
        for segment in locator.group.split('.') {
            path.push(segment);
        }
        path.push(&locator.name);
        path.push(&locator.version);
        path.push(locator.file_name());
        path
    }

    /// Resolves every dependency to an existing archive, in set order.
    pub fn resolve(&self, dependencies: &DependencySet) -> Result<Vec<PathBuf>, BoundaryError> {
        dependencies
            .iter()
            .map(|locator| {
                let path = self.archive_path(locator);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(BoundaryError::MissingArchive {
                        locator: locator.clone(),
                        path,
                    })
                }
            })
            .collect()
    }

    /// Resolves the dependencies and joins them into a platform class path.
    pub fn class_path(&self, dependencies: &DependencySet) -> Result<OsString, BoundaryError> {
        let archives = self.resolve(dependencies)?;
        std::env::join_paths(&archives)
            .map_err(|e| BoundaryError::Protocol(format!("cannot build class path: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn jasper() -> ArtifactLocator {
        "net.sf.jasperreports:jasperreports:6.21.0".parse().unwrap()
    }

    #[test]
    fn maven_layout() {
        let repo = LocalRepository::new("/repo");
        assert_eq!(
            repo.archive_path(&jasper()),
            PathBuf::from("/repo/net/sf/jasperreports/jasperreports/6.21.0/jasperreports-6.21.0.jar")
        );
    }

    #[test]
    fn tilde_expands_to_home() {
        let repo = LocalRepository::from_config_path("~/.m2/repository");
        if let Some(dirs) = BaseDirs::new() {
            assert_eq!(repo.root(), dirs.home_dir().join(".m2/repository"));
        }
        let plain = LocalRepository::from_config_path("/opt/repo");
        assert_eq!(plain.root(), Path::new("/opt/repo"));
        let named = LocalRepository::from_config_path("~other/repo");
        assert_eq!(named.root(), Path::new("~other/repo"));
    }

    #[test]
    fn resolve_reports_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path());
        let deps: DependencySet = [jasper()].into_iter().collect();
        let err = repo.resolve(&deps).unwrap_err();
        assert!(matches!(err, BoundaryError::MissingArchive { .. }));
    }

    #[test]
    fn class_path_keeps_dependency_order() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path());
        let itext: ArtifactLocator = "com.lowagie:itext:2.1.7.js10".parse().unwrap();
        for loc in [&jasper(), &itext] {
            let path = repo.archive_path(loc);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"").unwrap();
        }
        let deps: DependencySet = [jasper(), itext.clone()].into_iter().collect();
        let cp = repo.class_path(&deps).unwrap();
        let parts: Vec<PathBuf> = std::env::split_paths(&cp).collect();
        assert_eq!(parts, vec![repo.archive_path(&jasper()), repo.archive_path(&itext)]);
    }
}
