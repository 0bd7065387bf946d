//! High-level snapshot manager for one compile task.
//!
//! The `Cache` type ties together the snapshot manifest, source discovery and
//! hashing into a single interface for the orchestrator: detect what changed,
//! then record what was compiled so the next build can skip it.

use std::path::{Path, PathBuf};

use quire_common::ContentHash;

use crate::discover::SourceTree;
use crate::error::{CacheError, DetectionError};
use crate::hasher::{ChangeSet, SourceHasher};
use crate::manifest::{FileEntry, SnapshotManifest};
use crate::mapper::TreeLayout;

/// Snapshot manager for incremental builds.
///
/// All reads are fail-safe: corruption, a version change, or a different
/// compiler fingerprint results in an empty snapshot rather than an error.
pub struct Cache {
    /// Directory holding this task's manifest.
    cache_dir: PathBuf,

    /// The snapshot from the previous build, updated as jobs complete.
    manifest: SnapshotManifest,
}

impl Cache {
    /// Loads an existing snapshot or creates a fresh one.
    pub fn load_or_create(cache_dir: &Path, quire_version: &str, fingerprint: ContentHash) -> Self {
        let manifest = SnapshotManifest::load(cache_dir)
            .filter(|m| {
                let ok = m.is_compatible(quire_version, &fingerprint);
                if !ok {
                    tracing::info!(
                        cache = %cache_dir.display(),
                        "compiler configuration changed, discarding snapshot"
                    );
                }
                ok
            })
            .unwrap_or_else(|| SnapshotManifest::new(quire_version, fingerprint));

        Self {
            cache_dir: cache_dir.to_path_buf(),
            manifest,
        }
    }

    /// Creates an empty snapshot, ignoring anything on disk.
    pub fn fresh(cache_dir: &Path, quire_version: &str, fingerprint: ContentHash) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            manifest: SnapshotManifest::new(quire_version, fingerprint),
        }
    }

    /// Scans the source tree and classifies every design path.
    pub fn detect_changes(&self, layout: &TreeLayout) -> Result<ChangeSet, DetectionError> {
        let tree = SourceTree::scan(&layout.source_root, &layout.mapper)?;
        self.detect_changes_in(&tree, layout)
    }

    /// Classifies the paths of an already-scanned tree.
    pub fn detect_changes_in(
        &self,
        tree: &SourceTree,
        layout: &TreeLayout,
    ) -> Result<ChangeSet, DetectionError> {
        let hashes = tree.hash_all()?;
        Ok(SourceHasher::detect_changes(&hashes, &self.manifest, layout, |p| p.is_file()))
    }

    /// Records a successful compilation of `path` at `content_hash`.
    pub fn record_compiled(&mut self, path: &Path, content_hash: ContentHash, output: PathBuf) {
        self.manifest.files.insert(
            path.to_path_buf(),
            FileEntry {
                content_hash,
                output,
            },
        );
    }

    /// Drops `path` from the snapshot so the next build treats it as new.
    pub fn forget(&mut self, path: &Path) {
        self.manifest.files.remove(path);
    }

    /// Persists the current snapshot to disk.
    pub fn save(&self) -> Result<(), CacheError> {
        self.manifest.save(&self.cache_dir)
    }

    /// Deletes the snapshot file for a task.
    pub fn clear(cache_dir: &Path) -> Result<(), CacheError> {
        SnapshotManifest::remove(cache_dir)
    }

    /// Returns a reference to the current snapshot.
    pub fn manifest(&self) -> &SnapshotManifest {
        &self.manifest
    }
}
