//! The on-disk cache document.
//!
//! Each file is an object tagged by `type`. Which fields may appear depends
//! on the role, and anything else is a parse failure:
//!
//! | type             | fields                                                              |
//! |------------------|---------------------------------------------------------------------|
//! | `directory`      | `id`, `name`, `files`                                               |
//! | `interface`      | `id`, `mtime`, `hash`, `name`, `includes`                           |
//! | `implementation` | `id`, `mtime`, `hash`, `name`, `includes`, `defined_symbols`, `undefined_symbols` |
//! | `test`           | `id`, `mtime`, `hash`, `name`, `includes`, `undefined_symbols`      |
//!
//! Every role may also carry the optional `compiler`, `compiler_flags` and
//! `linker_flags` of the fragment attached to it. Files other than
//! directories may carry `include_paths`, the quoted include targets as
//! written, omitted when there are none. Lists are written sorted so
//! an unchanged tree always produces the same bytes.

use kiln_common::{FileId, MTime};
use kiln_config::{BuildFragment, Flags, LinkerConfig};
use kiln_index::{FileIdx, FileTree, Role, SymbolSet};
use serde::{Deserialize, Serialize};

/// Format version written into every cache; any other version is discarded.
pub const CACHE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A whole target's cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheDocument {
    /// Version of kiln that wrote the cache.
    pub version: String,
    /// Linker configuration of the last link.
    pub linker: LinkerConfig,
    /// The indexed tree.
    pub root: CachedFile,
}

/// One cached file, tagged by role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CachedFile {
    /// A directory.
    Directory(CachedDirectory),
    /// A header.
    Interface(CachedInterface),
    /// A translation unit.
    Implementation(CachedImplementation),
    /// A test translation unit.
    Test(CachedTest),
}

/// A cached directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CachedDirectory {
    /// File identity.
    pub id: FileId,
    /// Directory name.
    pub name: String,
    /// Fragment compiler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    /// Fragment compiler flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_flags: Option<Flags>,
    /// Fragment linker flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linker_flags: Option<Flags>,
    /// Children in name order.
    pub files: Vec<CachedFile>,
}

/// A cached header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CachedInterface {
    /// File identity.
    pub id: FileId,
    /// Modification time.
    pub mtime: MTime,
    /// Configuration hash.
    pub hash: u64,
    /// File name.
    pub name: String,
    /// Fragment compiler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    /// Fragment compiler flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_flags: Option<Flags>,
    /// Fragment linker flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linker_flags: Option<Flags>,
    /// Included file identities.
    pub includes: Vec<FileId>,
    /// Quoted include targets as written, resolved or not.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_paths: Vec<String>,
}

/// A cached translation unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CachedImplementation {
    /// File identity.
    pub id: FileId,
    /// Modification time.
    pub mtime: MTime,
    /// Configuration hash.
    pub hash: u64,
    /// File name.
    pub name: String,
    /// Fragment compiler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    /// Fragment compiler flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_flags: Option<Flags>,
    /// Fragment linker flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linker_flags: Option<Flags>,
    /// Included file identities.
    pub includes: Vec<FileId>,
    /// Quoted include targets as written, resolved or not.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_paths: Vec<String>,
    /// Symbols the object defines.
    pub defined_symbols: Vec<String>,
    /// Symbols the object references but does not define.
    pub undefined_symbols: Vec<String>,
}

/// A cached test translation unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CachedTest {
    /// File identity.
    pub id: FileId,
    /// Modification time.
    pub mtime: MTime,
    /// Configuration hash.
    pub hash: u64,
    /// File name.
    pub name: String,
    /// Fragment compiler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    /// Fragment compiler flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_flags: Option<Flags>,
    /// Fragment linker flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linker_flags: Option<Flags>,
    /// Included file identities.
    pub includes: Vec<FileId>,
    /// Quoted include targets as written, resolved or not.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_paths: Vec<String>,
    /// Symbols the object references but does not define.
    pub undefined_symbols: Vec<String>,
}

impl CacheDocument {
    /// Captures `tree` for the next run.
    ///
    /// Files whose include or symbol sets are unknown (unreadable, failed to
    /// compile, not yet compiled) are left out so the next run treats them
    /// as new.
    pub fn from_tree(tree: &FileTree, linker: &LinkerConfig) -> Self {
        let root = cached_file(tree, tree.root()).unwrap_or_else(|| {
            let file = tree.get(tree.root());
            CachedFile::Directory(CachedDirectory {
                id: file.id,
                name: file.name.clone(),
                compiler: None,
                compiler_flags: None,
                linker_flags: None,
                files: Vec::new(),
            })
        });
        Self {
            version: CACHE_VERSION.to_string(),
            linker: linker.clone(),
            root,
        }
    }

    /// Parses a cache document.
    pub fn parse(text: &str) -> Result<Self, crate::CacheError> {
        serde_json::from_str(text).map_err(|e| crate::CacheError::Parse {
            reason: e.to_string(),
        })
    }

    /// Renders the document as pretty-printed JSON.
    pub fn render(&self) -> Result<String, crate::CacheError> {
        serde_json::to_string_pretty(self).map_err(|e| crate::CacheError::Serialization {
            reason: e.to_string(),
        })
    }
}

fn cached_file(tree: &FileTree, idx: FileIdx) -> Option<CachedFile> {
    let file = tree.get(idx);
    if !file.role.is_complete() {
        return None;
    }
    let BuildFragment {
        compiler,
        compiler_flags,
        linker_flags,
    } = file.fragment.clone().unwrap_or_default();
    let includes = || {
        let mut ids: Vec<FileId> = file
            .role
            .includes()
            .map(|set| set.values().copied().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    };

    let cached = match &file.role {
        Role::Directory { children } => CachedFile::Directory(CachedDirectory {
            id: file.id,
            name: file.name.clone(),
            compiler,
            compiler_flags,
            linker_flags,
            files: children
                .iter()
                .filter_map(|&child| cached_file(tree, child))
                .collect(),
        }),
        Role::Interface { .. } => CachedFile::Interface(CachedInterface {
            id: file.id,
            mtime: file.mtime,
            hash: file.config_hash,
            name: file.name.clone(),
            compiler,
            compiler_flags,
            linker_flags,
            includes: includes(),
            include_paths: file.include_paths.clone(),
        }),
        Role::Implementation { .. } => CachedFile::Implementation(CachedImplementation {
            id: file.id,
            mtime: file.mtime,
            hash: file.config_hash,
            name: file.name.clone(),
            compiler,
            compiler_flags,
            linker_flags,
            includes: includes(),
            include_paths: file.include_paths.clone(),
            defined_symbols: sorted_symbols(file.role.defined()),
            undefined_symbols: sorted_symbols(file.role.undefined()),
        }),
        Role::Test { .. } => CachedFile::Test(CachedTest {
            id: file.id,
            mtime: file.mtime,
            hash: file.config_hash,
            name: file.name.clone(),
            compiler,
            compiler_flags,
            linker_flags,
            includes: includes(),
            include_paths: file.include_paths.clone(),
            undefined_symbols: sorted_symbols(file.role.undefined()),
        }),
    };
    Some(cached)
}

fn sorted_symbols(set: Option<&SymbolSet>) -> Vec<String> {
    let mut names: Vec<String> = set
        .map(|s| s.values().cloned().collect())
        .unwrap_or_default();
    names.sort();
    names
}
