//! Filesystem identities and modification times for project files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Stable identity of a file or directory on disk.
///
/// On Unix this is derived from the device and inode numbers, so it survives
/// renames and content edits. Identities must stay stable across runs for
/// cache entries to match; two files sharing an identity is not handled.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(u64);

impl FileId {
    /// Creates a `FileId` from a raw `u64` value.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw `u64` value of this `FileId`.
    pub fn as_raw(self) -> u64 {
        self.0
    }

    /// Derives the identity of `path` from its metadata.
    #[cfg(unix)]
    pub fn of(_path: &Path, meta: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self(meta.ino() ^ meta.dev().rotate_left(32))
    }

    /// Derives the identity of `path` from its canonical path.
    #[cfg(not(unix))]
    pub fn of(path: &Path, _meta: &Metadata) -> Self {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self(crate::hash::key_hash(
            canonical.to_string_lossy().as_bytes(),
        ))
    }

    /// Deterministic object file name for the translation unit with this identity.
    pub fn object_name(self) -> String {
        format!("{:016x}.o", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Modification time in nanoseconds since the Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MTime(u64);

impl MTime {
    /// Creates an `MTime` from raw nanoseconds.
    pub fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Returns the raw nanoseconds.
    pub fn as_nanos(self) -> u64 {
        self.0
    }

    /// Reads the modification time from file metadata.
    ///
    /// Platforms without modification times, and times before the epoch,
    /// yield zero.
    pub fn of(meta: &Metadata) -> Self {
        let nanos = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self(nanos)
    }
}
