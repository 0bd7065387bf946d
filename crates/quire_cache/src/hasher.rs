//! Source file hashing and change detection.
//!
//! Computes content hashes for design files and compares them against the
//! snapshot manifest to classify each path as added, modified, removed, or
//! unchanged since the last build.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use quire_common::ContentHash;

use crate::error::CacheError;
use crate::manifest::SnapshotManifest;
use crate::mapper::TreeLayout;

/// Classification of a design path relative to the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Present now, absent from the snapshot.
    Added,
    /// Present in both, with a different content hash (or a missing artifact).
    Modified,
    /// In the snapshot, no longer present.
    Removed,
    /// Same content hash as the snapshot and the artifact exists.
    Unchanged,
}

impl ChangeKind {
    /// Returns `true` for kinds that need a compilation job.
    pub fn is_dirty(self) -> bool {
        matches!(self, ChangeKind::Added | ChangeKind::Modified)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Removed => "removed",
            ChangeKind::Unchanged => "unchanged",
        })
    }
}

/// One design path and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Path relative to the source root.
    pub path: PathBuf,
    /// The classification.
    pub kind: ChangeKind,
    /// Absolute source path.
    pub source_path: PathBuf,
    /// Absolute output path. For removed paths this is the artifact the
    /// snapshot recorded, which may differ from what the layout maps to now.
    pub output_path: PathBuf,
    /// Hash of the current source; `None` for removed paths.
    pub content_hash: Option<ContentHash>,
    /// A previously recorded artifact at a different path than
    /// `output_path`, left behind by an extension change.
    pub stale_output: Option<PathBuf>,
}

/// Result of comparing the current source tree against the snapshot.
///
/// Holds exactly one record per path seen in either, sorted by relative path.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// All records in path order.
    pub records: Vec<ChangeRecord>,
}

impl ChangeSet {
    /// Returns `true` if there are no added, modified, or removed paths.
    pub fn is_empty(&self) -> bool {
        self.records.iter().all(|r| r.kind == ChangeKind::Unchanged)
    }

    /// Number of records of the given kind.
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    /// Returns the total number of designs that need compiling (added + modified).
    pub fn dirty_count(&self) -> usize {
        self.records.iter().filter(|r| r.kind.is_dirty()).count()
    }

    /// Records that need a compilation job.
    pub fn dirty(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(|r| r.kind.is_dirty())
    }

    /// Records of designs that were removed.
    pub fn removed(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(|r| r.kind == ChangeKind::Removed)
    }
}

/// Utility for computing content hashes of design files and detecting changes.
pub struct SourceHasher;

impl SourceHasher {
    /// Computes the content hash of a single file.
    pub fn hash_file(path: &Path) -> Result<ContentHash, CacheError> {
        let content = std::fs::read(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(ContentHash::from_bytes(&content))
    }

    /// Compares current hashes (keyed by relative path) against the snapshot.
    ///
    /// A path whose hash matches is `Unchanged` unless its artifact is missing
    /// (per `output_exists`) or the layout now maps it somewhere other than
    /// the recorded artifact, in which case it is `Modified`. Snapshot paths
    /// without a current source are `Removed` at their recorded artifact,
    /// even when the layout can no longer map them. Current paths the layout
    /// cannot map are ignored.
    pub fn detect_changes(
        current_hashes: &HashMap<PathBuf, ContentHash>,
        manifest: &SnapshotManifest,
        layout: &TreeLayout,
        output_exists: impl Fn(&Path) -> bool,
    ) -> ChangeSet {
        let all_paths: BTreeSet<&PathBuf> =
            current_hashes.keys().chain(manifest.files.keys()).collect();

        let mut records = Vec::with_capacity(all_paths.len());
        for path in all_paths {
            let current = current_hashes.get(path).copied();
            let entry = manifest.files.get(path);
            let recorded = entry.and_then(|e| recorded_output(layout, path, &e.output));

            let (kind, output_path) = match (current, entry) {
                (None, None) => continue,
                (None, Some(_)) => {
                    let Some(output) = recorded.clone().or_else(|| layout.output_path(path)) else {
                        tracing::debug!(path = %path.display(), "no artifact to remove");
                        continue;
                    };
                    (ChangeKind::Removed, output)
                }
                (Some(hash), entry) => {
                    let Some(output) = layout.output_path(path) else {
                        tracing::debug!(path = %path.display(), "not a design path, ignoring");
                        continue;
                    };
                    let kind = match entry {
                        None => ChangeKind::Added,
                        Some(e) if e.content_hash != hash => ChangeKind::Modified,
                        Some(_) if recorded.as_ref() != Some(&output) => {
                            tracing::debug!(path = %path.display(), "artifact path changed, recompiling");
                            ChangeKind::Modified
                        }
                        Some(_) if !output_exists(&output) => {
                            tracing::debug!(path = %path.display(), "artifact missing, recompiling");
                            ChangeKind::Modified
                        }
                        Some(_) => ChangeKind::Unchanged,
                    };
                    (kind, output)
                }
            };
            let stale_output = recorded.filter(|r| *r != output_path);
            records.push(ChangeRecord {
                path: path.clone(),
                kind,
                source_path: layout.source_path(path),
                output_path,
                content_hash: current,
                stale_output,
            });
        }

        ChangeSet { records }
    }
}

/// Resolves a recorded artifact path under the output root.
///
/// Only plain relative paths are honoured, so a tampered snapshot cannot
/// point removals outside the output tree.
fn recorded_output(layout: &TreeLayout, path: &Path, output: &Path) -> Option<PathBuf> {
    let plain = !output.as_os_str().is_empty()
        && output.components().all(|c| matches!(c, Component::Normal(_)));
    if !plain {
        tracing::warn!(path = %path.display(), output = %output.display(), "ignoring recorded artifact outside the output tree");
        return None;
    }
    Some(layout.output_root.join(output))
}
