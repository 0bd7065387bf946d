//! Error types for change detection and snapshot persistence.

use std::path::PathBuf;

/// Errors raised while reading or writing the snapshot manifest.
///
/// Loading is fail-safe (a bad manifest means a full rebuild), so in practice
/// these only surface when saving.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

/// The source tree could not be listed or read, so no job list can be computed.
///
/// This aborts the whole invocation before any compilation job is submitted.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    /// A directory inside the source tree could not be read.
    #[error("cannot read source directory {path}: {source}")]
    Unreadable {
        /// The directory that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A design file was listed but could not be read.
    #[error("cannot read source file {path}: {source}")]
    UnreadableSource {
        /// The design file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The configured source root exists but is not a directory.
    #[error("source path {0} is not a directory")]
    NotADirectory(PathBuf),
}
