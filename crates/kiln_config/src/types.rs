//! Configuration types deserialized from `kiln.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::fragment::BuildFragment;

/// The top-level project configuration parsed from `kiln.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Extra compiler registrations, keyed by executable name.
    #[serde(default)]
    pub compilers: BTreeMap<String, CompilerSpec>,
    /// Named executables to build.
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

/// Core project metadata required in every `kiln.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    pub version: String,
    /// Directory (relative to the project root) holding objects, outputs and caches.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
}

/// File extensions a compiler treats as translation units and as headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerSpec {
    /// Extensions (without the dot) of files compiled to objects.
    pub sources: Vec<String>,
    /// Extensions (without the dot) of files only included.
    #[serde(default)]
    pub headers: Vec<String>,
}

/// Configuration for one executable.
#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    /// Directory indexed for this target, relative to the project root.
    #[serde(default = "default_root")]
    pub root: String,
    /// Path suffix identifying the entry file (the link root).
    pub entry: String,
    /// Executable name. Defaults to the target name.
    #[serde(default)]
    pub output: Option<String>,
    /// File name prefix marking test files.
    #[serde(default = "default_test_prefix")]
    pub test_prefix: String,
    /// Paths (relative to the project root) excluded from indexing.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Additional files or directories indexed as children of the root.
    #[serde(default)]
    pub extra: Vec<String>,
    /// Base compiler executable.
    #[serde(default = "default_driver")]
    pub compiler: String,
    /// Base compiler flags.
    #[serde(default)]
    pub compiler_flags: Vec<String>,
    /// Linker executable.
    #[serde(default = "default_driver")]
    pub linker: String,
    /// Base linker flags, placed before any per-file linker flags.
    #[serde(default)]
    pub linker_flags: Vec<String>,
    /// Tool printing an object's symbol table in POSIX format.
    #[serde(default = "default_symbols")]
    pub symbols: String,
    /// Configuration fragments keyed by path relative to the project root.
    #[serde(default)]
    pub paths: BTreeMap<String, BuildFragment>,
}

fn default_build_dir() -> String {
    "build".to_string()
}

fn default_root() -> String {
    ".".to_string()
}

fn default_test_prefix() -> String {
    "test_".to_string()
}

fn default_driver() -> String {
    "cc".to_string()
}

fn default_symbols() -> String {
    "nm".to_string()
}
