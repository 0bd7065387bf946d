//! Snapshot manifest recording what the previous build compiled.
//!
//! The manifest is stored as `manifest.json` in a task's cache directory. It
//! records, per relative design path, the content hash of the source as it was
//! last compiled successfully. A tool version and a compiler fingerprint guard
//! the whole file: if either differs, the snapshot is ignored and every design
//! is recompiled.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quire_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Name of the manifest file within the cache directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Previously-seen state of one task's source tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotManifest {
    /// Quire version that produced this snapshot.
    pub quire_version: String,

    /// Fingerprint of the compiler configuration and dependency set.
    pub fingerprint: ContentHash,

    /// Per-design state keyed by path relative to the source root.
    pub files: BTreeMap<PathBuf, FileEntry>,
}

/// Recorded state for a single compiled design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Content hash of the design when it was last compiled.
    pub content_hash: ContentHash,

    /// Output path relative to the output root.
    pub output: PathBuf,
}

impl SnapshotManifest {
    /// Creates an empty snapshot.
    pub fn new(quire_version: &str, fingerprint: ContentHash) -> Self {
        Self {
            quire_version: quire_version.to_string(),
            fingerprint,
            files: BTreeMap::new(),
        }
    }

    /// Loads the manifest from the cache directory, returning `None` if
    /// the file doesn't exist or can't be parsed.
    ///
    /// Any error results in `None`, which triggers a full rebuild.
    pub fn load(cache_dir: &Path) -> Option<Self> {
        let path = cache_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!("ignoring corrupt snapshot {}: {e}", path.display());
                None
            }
        }
    }

    /// Saves the manifest to the cache directory.
    ///
    /// Creates the cache directory if it doesn't exist. The file is written to
    /// a sibling temporary path first and renamed over the old one.
    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(cache_dir).map_err(|e| CacheError::Io {
            path: cache_dir.to_path_buf(),
            source: e,
        })?;
        let path = cache_dir.join(MANIFEST_FILE);
        let tmp = cache_dir.join(format!("{MANIFEST_FILE}.tmp"));
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(&tmp, json).map_err(|e| CacheError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Deletes the manifest file. Missing files are not an error.
    pub fn remove(cache_dir: &Path) -> Result<(), CacheError> {
        let path = cache_dir.join(MANIFEST_FILE);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }

    /// Returns `true` if this snapshot was produced by the same Quire version
    /// with the same compiler fingerprint.
    pub fn is_compatible(&self, current_version: &str, fingerprint: &ContentHash) -> bool {
        self.quire_version == current_version && self.fingerprint == *fingerprint
    }
}
