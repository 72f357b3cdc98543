//! Loaded cache entries keyed by file identity.

use kiln_common::FileId;
use kiln_config::LinkerConfig;
use kiln_index::{include_set, symbol_set, Role, RoleKind};
use kiln_table::Table;

use crate::document::{CacheDocument, CachedFile};

/// What the previous run knew about one non-directory file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    /// File identity.
    pub id: FileId,
    /// Role at the time.
    pub kind: RoleKind,
    /// File name, for reporting removed files.
    pub name: String,
    /// Configuration hash.
    pub hash: u64,
    /// Included file identities.
    pub includes: Vec<FileId>,
    /// Quoted include targets as written, resolved or not.
    pub include_paths: Vec<String>,
    /// Defined symbols; empty for headers and tests.
    pub defined: Vec<String>,
    /// Undefined symbols; empty for headers.
    pub undefined: Vec<String>,
}

impl CacheEntry {
    /// Copies the cached include and symbol sets into `role`.
    ///
    /// Callers check that the roles agree first; a role of another kind
    /// keeps whatever applies to it.
    pub fn apply_to(&self, role: &mut Role) {
        role.set_includes(include_set(self.includes.iter().copied()));
        if matches!(self.kind, RoleKind::Implementation | RoleKind::Test) {
            role.set_symbols(
                symbol_set(self.defined.iter().cloned()),
                symbol_set(self.undefined.iter().cloned()),
            );
        }
    }
}

/// A previous run's cache, flattened for lookup.
#[derive(Clone, Debug)]
pub struct CacheSnapshot {
    entries: Table<CacheEntry>,
    linker: LinkerConfig,
}

impl CacheSnapshot {
    /// Flattens a document. Directories are not kept.
    pub fn from_document(document: CacheDocument) -> Self {
        let mut entries = Table::new();
        let mut stack = vec![document.root];
        while let Some(file) = stack.pop() {
            let entry = match file {
                CachedFile::Directory(dir) => {
                    stack.extend(dir.files.into_iter().rev());
                    continue;
                }
                CachedFile::Interface(f) => CacheEntry {
                    id: f.id,
                    kind: RoleKind::Interface,
                    name: f.name,
                    hash: f.hash,
                    includes: f.includes,
                    include_paths: f.include_paths,
                    defined: Vec::new(),
                    undefined: Vec::new(),
                },
                CachedFile::Implementation(f) => CacheEntry {
                    id: f.id,
                    kind: RoleKind::Implementation,
                    name: f.name,
                    hash: f.hash,
                    includes: f.includes,
                    include_paths: f.include_paths,
                    defined: f.defined_symbols,
                    undefined: f.undefined_symbols,
                },
                CachedFile::Test(f) => CacheEntry {
                    id: f.id,
                    kind: RoleKind::Test,
                    name: f.name,
                    hash: f.hash,
                    includes: f.includes,
                    include_paths: f.include_paths,
                    defined: Vec::new(),
                    undefined: f.undefined_symbols,
                },
            };
            entries.add(entry.id.as_raw(), entry);
        }
        Self {
            entries,
            linker: document.linker,
        }
    }

    /// The entry for `id`, if the previous run cached it.
    pub fn get(&self, id: FileId) -> Option<&CacheEntry> {
        self.entries.get(id.as_raw())
    }

    /// Every cached entry, in unspecified order.
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> + '_ {
        self.entries.values()
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no file was cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Linker configuration of the last link.
    pub fn linker(&self) -> &LinkerConfig {
        &self.linker
    }
}
