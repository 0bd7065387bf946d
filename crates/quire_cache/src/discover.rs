//! Source tree discovery.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use quire_common::ContentHash;

use crate::error::DetectionError;
use crate::mapper::PathMapper;

/// Snapshot of the design files under a source root, taken once per build.
///
/// Paths are relative to the root and sorted. Directories are never listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl SourceTree {
    /// Recursively lists every design file under `root`.
    ///
    /// A missing root yields an empty tree (nothing to compile, every previous
    /// output is stale). A root that exists but cannot be listed is a
    /// [`DetectionError`].
    pub fn scan(root: &Path, mapper: &PathMapper) -> Result<Self, DetectionError> {
        let mut files = Vec::new();
        match std::fs::metadata(root) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(root = %root.display(), "source directory does not exist");
            }
            Err(e) => {
                return Err(DetectionError::Unreadable {
                    path: root.to_path_buf(),
                    source: e,
                })
            }
            Ok(meta) if !meta.is_dir() => {
                return Err(DetectionError::NotADirectory(root.to_path_buf()))
            }
            Ok(_) => walk_dir(root, Path::new(""), mapper, &mut files)?,
        }
        files.sort();
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Builds a tree from an explicit list of relative paths.
    pub fn from_files(root: impl Into<PathBuf>, mut files: Vec<PathBuf>) -> Self {
        files.sort();
        files.dedup();
        Self {
            root: root.into(),
            files,
        }
    }

    /// The source root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative design paths, sorted.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of design files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the tree holds no design files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Hashes every design, keyed by relative path.
    ///
    /// Files that disappear between listing and hashing are skipped and will
    /// therefore be seen as removed. Any other read failure is a
    /// [`DetectionError`], since the file is still there.
    pub fn hash_all(&self) -> Result<HashMap<PathBuf, ContentHash>, DetectionError> {
        let mut hashes = HashMap::with_capacity(self.files.len());
        for rel in &self.files {
            let path = self.root.join(rel);
            match std::fs::read(&path) {
                Ok(content) => {
                    hashes.insert(rel.clone(), ContentHash::from_bytes(&content));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %rel.display(), "vanished before hashing");
                }
                Err(source) => return Err(DetectionError::UnreadableSource { path, source }),
            }
        }
        Ok(hashes)
    }
}

/// Recursively walks a directory collecting design files relative to the root.
fn walk_dir(
    dir: &Path,
    relative: &Path,
    mapper: &PathMapper,
    files: &mut Vec<PathBuf>,
) -> Result<(), DetectionError> {
    let unreadable = |source| DetectionError::Unreadable {
        path: dir.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let rel = relative.join(entry.file_name());
        let file_type = entry.file_type().map_err(unreadable)?;
        if file_type.is_dir() {
            walk_dir(&entry.path(), &rel, mapper, files)?;
        } else if mapper.matches(&rel) && entry.path().is_file() {
            files.push(rel);
        }
    }
    Ok(())
}
