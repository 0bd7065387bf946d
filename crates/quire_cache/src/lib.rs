//! Incremental change detection for report design trees.
//!
//! This crate maps a source tree onto its mirrored output tree, hashes the
//! current sources, and compares them against the snapshot manifest written by
//! the previous build so that only added or modified designs are recompiled.

#![warn(missing_docs)]

pub mod cache;
pub mod discover;
pub mod error;
pub mod hasher;
pub mod manifest;
pub mod mapper;

pub use cache::Cache;
pub use discover::SourceTree;
pub use error::{CacheError, DetectionError};
pub use hasher::{ChangeKind, ChangeRecord, ChangeSet, SourceHasher};
pub use manifest::{FileEntry, SnapshotManifest};
pub use mapper::{PathMapper, TreeLayout};
