//! Build configuration fragments and their root-to-leaf composition.
//!
//! A [`BuildFragment`] can be attached to any file or directory. Walking from
//! the project root down to a file and composing every fragment on the way
//! yields that file's [`ResolvedConfig`]: one compiler and one ordered flag
//! list for compiling, plus the linker flags the file contributes when its
//! object is linked.

use std::fmt;

use kiln_common::{key_hash, HashBuilder};
use kiln_table::KeySet;
use serde::{Deserialize, Serialize};

use crate::error::FlagError;

/// A configuration fragment attached to a path.
///
/// `compiler` replaces the inherited compiler. Each flag list is either a full
/// replacement or an add/remove delta against the inherited list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildFragment {
    /// Replacement compiler executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    /// Compiler flag replacement or delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_flags: Option<Flags>,
    /// Linker flag replacement or delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linker_flags: Option<Flags>,
}

impl BuildFragment {
    /// Returns `true` if the fragment changes nothing.
    pub fn is_empty(&self) -> bool {
        self.compiler.is_none() && self.compiler_flags.is_none() && self.linker_flags.is_none()
    }
}

/// A flag list in a fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flags {
    /// Replaces the inherited list outright.
    Replace(Vec<String>),
    /// Adds to and removes from the inherited list.
    Delta(FlagDelta),
}

/// Flags to add to and remove from an inherited list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagDelta {
    /// Flags appended after the inherited ones.
    #[serde(default)]
    pub add: Vec<String>,
    /// Flags dropped from the inherited ones.
    #[serde(default)]
    pub remove: Vec<String>,
}

/// Which flag list a [`FlagError`] concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagKind {
    /// Flags passed to the compiler.
    Compiler,
    /// Flags passed to the linker.
    Linker,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagKind::Compiler => write!(f, "compiler"),
            FlagKind::Linker => write!(f, "linker"),
        }
    }
}

/// An ordered flag list plus every flag removed along the ancestor chain.
#[derive(Clone, Debug, Default)]
pub struct FlagSet {
    flags: Vec<String>,
    removed: KeySet,
}

impl FlagSet {
    /// Creates a set holding `flags` with nothing removed.
    pub fn new(flags: Vec<String>) -> Self {
        Self {
            flags,
            removed: KeySet::new(),
        }
    }

    /// The effective flags, in order.
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Returns `true` if `flag` was removed somewhere on the chain.
    pub fn was_removed(&self, flag: &str) -> bool {
        self.removed.has(key_hash(flag.as_bytes()))
    }

    fn apply(&mut self, flags: &Flags, kind: FlagKind) -> Result<(), FlagError> {
        let delta = match flags {
            Flags::Replace(list) => {
                self.flags = list.clone();
                self.removed.clear();
                return Ok(());
            }
            Flags::Delta(delta) => delta,
        };

        let mut added = KeySet::new();
        for flag in &delta.add {
            if added.insert(key_hash(flag.as_bytes())) {
                return Err(FlagError::DuplicateAdd {
                    kind,
                    flag: flag.clone(),
                });
            }
        }
        let mut removed = KeySet::new();
        for flag in &delta.remove {
            let hash = key_hash(flag.as_bytes());
            if removed.insert(hash) {
                return Err(FlagError::DuplicateRemove {
                    kind,
                    flag: flag.clone(),
                });
            }
            if added.has(hash) {
                return Err(FlagError::AddedAndRemoved {
                    kind,
                    flag: flag.clone(),
                });
            }
        }

        // Same-fragment overlap is rejected above, so a hit in `self.removed`
        // while adding always comes from an ancestor.
        for flag in &delta.add {
            if self.was_removed(flag) {
                return Err(FlagError::AddAfterRemove {
                    kind,
                    flag: flag.clone(),
                });
            }
            if self.flags.contains(flag) {
                return Err(FlagError::AlreadyAdded {
                    kind,
                    flag: flag.clone(),
                });
            }
        }

        for flag in &delta.remove {
            self.flags.retain(|f| f != flag);
            self.removed.insert(key_hash(flag.as_bytes()));
        }
        self.flags.extend(delta.add.iter().cloned());
        Ok(())
    }
}

/// The effective build configuration of one file.
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    /// Compiler executable.
    pub compiler: String,
    /// Flags passed when compiling the file.
    pub compiler_flags: FlagSet,
    /// Flags the file's object contributes to the link command.
    pub linker_flags: FlagSet,
}

impl ResolvedConfig {
    /// Base configuration for a target: its compiler and flags, no linker flags.
    pub fn base(compiler: impl Into<String>, compiler_flags: Vec<String>) -> Self {
        Self {
            compiler: compiler.into(),
            compiler_flags: FlagSet::new(compiler_flags),
            linker_flags: FlagSet::default(),
        }
    }

    /// Hash of everything that affects the compile and link commands.
    pub fn fingerprint(&self) -> u64 {
        HashBuilder::new()
            .str(&self.compiler)
            .strs(self.compiler_flags.flags())
            .strs(self.linker_flags.flags())
            .finish()
    }
}

/// Composes one fragment on top of an inherited configuration.
///
/// Closer fragments override or extend farther ones, so callers must compose
/// root-to-leaf.
pub fn compose(parent: &ResolvedConfig, fragment: &BuildFragment) -> Result<ResolvedConfig, FlagError> {
    let mut next = parent.clone();
    if let Some(compiler) = &fragment.compiler {
        next.compiler = compiler.clone();
    }
    if let Some(flags) = &fragment.compiler_flags {
        next.compiler_flags.apply(flags, FlagKind::Compiler)?;
    }
    if let Some(flags) = &fragment.linker_flags {
        next.linker_flags.apply(flags, FlagKind::Linker)?;
    }
    Ok(next)
}
