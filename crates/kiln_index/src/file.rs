//! Indexed files and their roles.

use std::fmt;
use std::path::PathBuf;

use kiln_common::{key_hash, FileId, MTime};
use kiln_config::BuildFragment;
use kiln_table::Table;

use crate::ids::{ConfigIdx, FileIdx};

/// Symbol names keyed by [`key_hash`] of the name.
pub type SymbolSet = Table<String>;

/// Included file identities keyed by their raw id.
pub type IncludeSet = Table<FileId>;

/// Builds a [`SymbolSet`] from names.
pub fn symbol_set<I, S>(names: I) -> SymbolSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut set = SymbolSet::new();
    for name in names {
        let name = name.into();
        set.add(key_hash(name.as_bytes()), name);
    }
    set
}

/// Builds an include set from file identities.
pub fn include_set<I: IntoIterator<Item = FileId>>(ids: I) -> IncludeSet {
    let mut set = IncludeSet::new();
    for id in ids {
        set.add(id.as_raw(), id);
    }
    set
}

/// One indexed file or directory.
#[derive(Debug)]
pub struct File {
    /// Filesystem identity.
    pub id: FileId,
    /// Modification time at indexing.
    pub mtime: MTime,
    /// Path used to open the file.
    pub path: PathBuf,
    /// Path relative to the project root, used for fragments and reporting.
    pub rel: PathBuf,
    /// File name.
    pub name: String,
    /// Containing directory; `None` only for the root.
    pub parent: Option<FileIdx>,
    /// Configuration fragment attached to this path.
    pub fragment: Option<BuildFragment>,
    /// Composed configuration in effect for this file.
    pub config: ConfigIdx,
    /// Identity, mtime and composed configuration folded into one hash.
    pub config_hash: u64,
    /// Quoted include targets as written, sorted and deduplicated. Includes
    /// that resolved to no file are kept so a later run can resolve them.
    pub include_paths: Vec<String>,
    /// Role and role-specific data.
    pub role: Role,
}

impl File {
    /// Returns `true` for implementation and test files.
    pub fn is_compiled(&self) -> bool {
        matches!(
            self.role,
            Role::Implementation { .. } | Role::Test { .. }
        )
    }
}

/// What a file is to the build, with the data only that role carries.
///
/// Include and symbol sets start as `None` and are filled from the cache or
/// by scanning and compiling.
#[derive(Debug)]
pub enum Role {
    /// A directory and its children in name order.
    Directory {
        /// Child files.
        children: Vec<FileIdx>,
    },
    /// A header, only ever included.
    Interface {
        /// Files this header includes.
        includes: Option<IncludeSet>,
    },
    /// A translation unit that can provide symbols to others.
    Implementation {
        /// Files this unit includes.
        includes: Option<IncludeSet>,
        /// Symbols the compiled object defines.
        defined: Option<SymbolSet>,
        /// Symbols the compiled object references but does not define.
        undefined: Option<SymbolSet>,
    },
    /// A translation unit with its own `main`; never a provider.
    Test {
        /// Files this unit includes.
        includes: Option<IncludeSet>,
        /// Symbols the compiled object references but does not define.
        undefined: Option<SymbolSet>,
    },
}

impl Role {
    /// An implementation with nothing computed yet.
    pub fn implementation() -> Self {
        Role::Implementation {
            includes: None,
            defined: None,
            undefined: None,
        }
    }

    /// A test with nothing computed yet.
    pub fn test() -> Self {
        Role::Test {
            includes: None,
            undefined: None,
        }
    }

    /// The payload-free kind.
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Directory { .. } => RoleKind::Directory,
            Role::Interface { .. } => RoleKind::Interface,
            Role::Implementation { .. } => RoleKind::Implementation,
            Role::Test { .. } => RoleKind::Test,
        }
    }

    /// The include set, if this role has one and it is known.
    pub fn includes(&self) -> Option<&IncludeSet> {
        match self {
            Role::Directory { .. } => None,
            Role::Interface { includes }
            | Role::Implementation { includes, .. }
            | Role::Test { includes, .. } => includes.as_ref(),
        }
    }

    /// Stores an include set. Directories ignore it.
    pub fn set_includes(&mut self, set: IncludeSet) {
        match self {
            Role::Directory { .. } => {}
            Role::Interface { includes }
            | Role::Implementation { includes, .. }
            | Role::Test { includes, .. } => *includes = Some(set),
        }
    }

    /// Defined symbols; only implementations have them.
    pub fn defined(&self) -> Option<&SymbolSet> {
        match self {
            Role::Implementation { defined, .. } => defined.as_ref(),
            _ => None,
        }
    }

    /// Undefined symbols of an implementation or test.
    pub fn undefined(&self) -> Option<&SymbolSet> {
        match self {
            Role::Implementation { undefined, .. } | Role::Test { undefined, .. } => {
                undefined.as_ref()
            }
            _ => None,
        }
    }

    /// Stores symbol sets. Tests drop `defined_set`; headers and directories ignore both.
    pub fn set_symbols(&mut self, defined_set: SymbolSet, undefined_set: SymbolSet) {
        match self {
            Role::Implementation {
                defined, undefined, ..
            } => {
                *defined = Some(defined_set);
                *undefined = Some(undefined_set);
            }
            Role::Test { undefined, .. } => *undefined = Some(undefined_set),
            Role::Directory { .. } | Role::Interface { .. } => {}
        }
    }

    /// Forgets symbol sets, after a failed or pending recompile.
    pub fn clear_symbols(&mut self) {
        match self {
            Role::Implementation {
                defined, undefined, ..
            } => {
                *defined = None;
                *undefined = None;
            }
            Role::Test { undefined, .. } => *undefined = None,
            Role::Directory { .. } | Role::Interface { .. } => {}
        }
    }

    /// Returns `true` once every set this role carries is known.
    pub fn is_complete(&self) -> bool {
        match self {
            Role::Directory { .. } => true,
            Role::Interface { includes } => includes.is_some(),
            Role::Implementation {
                includes,
                defined,
                undefined,
            } => includes.is_some() && defined.is_some() && undefined.is_some(),
            Role::Test {
                includes,
                undefined,
            } => includes.is_some() && undefined.is_some(),
        }
    }
}

/// The role of a file without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoleKind {
    /// A directory.
    Directory,
    /// A header.
    Interface,
    /// A translation unit.
    Implementation,
    /// A test translation unit.
    Test,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleKind::Directory => write!(f, "directory"),
            RoleKind::Interface => write!(f, "interface"),
            RoleKind::Implementation => write!(f, "implementation"),
            RoleKind::Test => write!(f, "test"),
        }
    }
}
