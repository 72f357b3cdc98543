//! The arena of indexed files.

use std::path::{Path, PathBuf};

use kiln_common::{path_key, FileId, HashBuilder, InternalError, KilnResult, MTime};
use kiln_config::ResolvedConfig;
use kiln_table::Table;

use crate::file::File;
use crate::ids::{ConfigIdx, FileIdx};

/// A composed configuration shared by every file below the fragment that produced it.
#[derive(Clone, Debug)]
pub struct ConfigEntry {
    /// The composed configuration.
    pub resolved: ResolvedConfig,
    /// Fingerprint of `resolved`, computed once.
    pub fingerprint: u64,
    /// Path of the fragment whose composition failed, if any ancestor's did.
    pub poisoned: Option<PathBuf>,
}

impl ConfigEntry {
    pub(crate) fn new(resolved: ResolvedConfig) -> Self {
        let fingerprint = resolved.fingerprint();
        Self {
            resolved,
            fingerprint,
            poisoned: None,
        }
    }
}

/// Every indexed file of a target, in walk order.
///
/// Files are addressed by [`FileIdx`] within a run and by [`FileId`] across
/// runs. The root directory is always at index 0.
#[derive(Debug)]
pub struct FileTree {
    files: Vec<File>,
    by_id: Table<FileIdx>,
    by_path: Table<FileIdx>,
    configs: Vec<ConfigEntry>,
    entry: FileIdx,
}

impl FileTree {
    pub(crate) fn new() -> Self {
        Self {
            files: Vec::new(),
            by_id: Table::new(),
            by_path: Table::new(),
            configs: Vec::new(),
            entry: FileIdx::from_raw(0),
        }
    }

    /// Adds a file, returning `None` if its identity is already indexed.
    pub(crate) fn push(&mut self, file: File) -> Option<FileIdx> {
        if self.by_id.has(file.id.as_raw()) {
            return None;
        }
        let idx = FileIdx::from_raw(self.files.len() as u32);
        self.by_id.add(file.id.as_raw(), idx);
        self.by_path.add(path_key(&file.path), idx);
        self.files.push(file);
        Some(idx)
    }

    pub(crate) fn push_config(&mut self, entry: ConfigEntry) -> ConfigIdx {
        let idx = ConfigIdx::from_raw(self.configs.len() as u32);
        self.configs.push(entry);
        idx
    }

    pub(crate) fn set_entry(&mut self, entry: FileIdx) {
        self.entry = entry;
    }

    /// Number of indexed files, directories included.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The root directory.
    pub fn root(&self) -> FileIdx {
        FileIdx::from_raw(0)
    }

    /// The entry file.
    pub fn entry(&self) -> FileIdx {
        self.entry
    }

    /// Returns the file at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` did not come from this tree.
    pub fn get(&self, idx: FileIdx) -> &File {
        &self.files[idx.index()]
    }

    /// Returns the file at `idx` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `idx` did not come from this tree.
    pub fn get_mut(&mut self, idx: FileIdx) -> &mut File {
        &mut self.files[idx.index()]
    }

    /// Looks up a file by identity.
    pub fn lookup(&self, id: FileId) -> Option<FileIdx> {
        self.by_id.get(id.as_raw()).copied()
    }

    /// Looks up a file by identity, treating absence as a broken invariant.
    pub fn require(&self, id: FileId) -> KilnResult<FileIdx> {
        self.lookup(id)
            .ok_or_else(|| InternalError::new(format!("file {id} is not indexed")))
    }

    /// Looks up a file by the path it was indexed under, after normalization.
    pub fn lookup_path(&self, path: &Path) -> Option<FileIdx> {
        self.by_path.get(path_key(path)).copied()
    }

    /// Iterates over every file in walk order.
    pub fn iter(&self) -> impl Iterator<Item = (FileIdx, &File)> + '_ {
        self.files
            .iter()
            .enumerate()
            .map(|(i, file)| (FileIdx::from_raw(i as u32), file))
    }

    /// Indices of every file in walk order.
    pub fn indices(&self) -> impl Iterator<Item = FileIdx> {
        (0..self.files.len() as u32).map(FileIdx::from_raw)
    }

    /// The composed configuration of a file.
    pub fn config(&self, idx: FileIdx) -> &ConfigEntry {
        &self.configs[self.get(idx).config.index()]
    }

    /// The composed configuration at `idx` in the configuration list.
    pub fn config_at(&self, idx: ConfigIdx) -> &ConfigEntry {
        &self.configs[idx.index()]
    }

    /// The ancestors of a file from the root down, the file itself excluded.
    pub fn ancestors(&self, idx: FileIdx) -> Vec<FileIdx> {
        let mut chain = Vec::new();
        let mut current = self.get(idx).parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.get(parent).parent;
        }
        chain.reverse();
        chain
    }
}

/// Folds a file's identity, modification time and composed configuration into one hash.
///
/// Two runs agree on this hash exactly when neither the file's mtime nor any
/// fragment on its ancestor chain changed.
pub fn configuration_hash(id: FileId, mtime: MTime, config: &ConfigEntry) -> u64 {
    HashBuilder::new()
        .u64(id.as_raw())
        .u64(mtime.as_nanos())
        .u64(config.fingerprint)
        .u64(config.poisoned.is_some() as u64)
        .finish()
}
