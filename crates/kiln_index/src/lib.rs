//! The file index: every project file with its identity, role and build configuration.
//!
//! [`index`] walks a target's root directory (plus its extra paths), assigns
//! each file a filesystem-stable [`FileId`](kiln_common::FileId), classifies it
//! as a directory, interface, implementation or test, composes the
//! configuration fragments along its ancestor chain and computes its
//! configuration hash. The result is a [`FileTree`] arena.

#![warn(missing_docs)]

pub mod error;
pub mod file;
pub mod ids;
pub mod tree;
pub mod walk;

pub use error::IndexError;
pub use file::{include_set, symbol_set, File, IncludeSet, Role, RoleKind, SymbolSet};
pub use ids::{ConfigIdx, FileIdx};
pub use tree::{configuration_hash, ConfigEntry, FileTree};
pub use walk::index;
