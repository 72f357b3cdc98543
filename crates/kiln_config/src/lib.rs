//! Parsing and validation of `kiln.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a strongly-typed
//! [`ProjectConfig`], resolves a named target into a [`ResolvedTarget`], and
//! implements the order-sensitive composition of per-path [`BuildFragment`]s
//! into the effective [`ResolvedConfig`] of each file.

#![warn(missing_docs)]

pub mod error;
pub mod fragment;
pub mod loader;
pub mod registry;
pub mod resolve;
pub mod types;

pub use error::{ConfigError, FlagError};
pub use fragment::{compose, BuildFragment, FlagDelta, FlagKind, FlagSet, Flags, ResolvedConfig};
pub use loader::{find_project_root, load_config, load_config_from_str, CONFIG_FILE};
pub use registry::{CompilerRegistry, SourceKind};
pub use resolve::{resolve_target, select_target, LinkerConfig, ResolvedTarget};
pub use types::*;
