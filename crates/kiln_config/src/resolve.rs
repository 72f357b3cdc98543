//! Target resolution: turning a `[targets.<name>]` table into build inputs.

use crate::error::ConfigError;
use crate::fragment::{BuildFragment, ResolvedConfig};
use crate::registry::CompilerRegistry;
use crate::types::ProjectConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The linker and the flags every link of a target starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerConfig {
    /// Linker executable.
    pub name: String,
    /// Base linker flags.
    pub flags: Vec<String>,
}

/// A target with every default applied and paths made relative to the project root.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// The target name.
    pub name: String,
    /// Executable file name.
    pub output: String,
    /// Build directory relative to the project root.
    pub build_dir: PathBuf,
    /// Indexed root directory relative to the project root.
    pub root: PathBuf,
    /// Entry path suffix.
    pub entry: String,
    /// Test file name prefix.
    pub test_prefix: String,
    /// Excluded paths relative to the project root.
    pub ignore: Vec<PathBuf>,
    /// Additional paths relative to the project root.
    pub extra: Vec<PathBuf>,
    /// Configuration every file starts from before fragments apply.
    pub base: ResolvedConfig,
    /// Linker and base linker flags.
    pub linker: LinkerConfig,
    /// Symbol table tool.
    pub symbols: String,
    /// Fragments keyed by path relative to the project root.
    pub fragments: BTreeMap<PathBuf, BuildFragment>,
    /// Compiler extension knowledge.
    pub registry: CompilerRegistry,
}

/// Resolves a named target.
pub fn resolve_target(
    config: &ProjectConfig,
    target_name: &str,
) -> Result<ResolvedTarget, ConfigError> {
    let target = config
        .targets
        .get(target_name)
        .ok_or_else(|| ConfigError::UnknownTarget(target_name.to_string()))?;

    let fragments = target
        .paths
        .iter()
        .filter(|(_, fragment)| !fragment.is_empty())
        .map(|(path, fragment)| (PathBuf::from(path), fragment.clone()))
        .collect();

    Ok(ResolvedTarget {
        name: target_name.to_string(),
        output: target
            .output
            .clone()
            .unwrap_or_else(|| target_name.to_string()),
        build_dir: PathBuf::from(&config.project.build_dir),
        root: PathBuf::from(&target.root),
        entry: target.entry.clone(),
        test_prefix: target.test_prefix.clone(),
        ignore: target.ignore.iter().map(PathBuf::from).collect(),
        extra: target.extra.iter().map(PathBuf::from).collect(),
        base: ResolvedConfig::base(&target.compiler, target.compiler_flags.clone()),
        linker: LinkerConfig {
            name: target.linker.clone(),
            flags: target.linker_flags.clone(),
        },
        symbols: target.symbols.clone(),
        fragments,
        registry: CompilerRegistry::with_overrides(&config.compilers),
    })
}

/// Picks the target to build.
///
/// A named target must exist. Without a name, a configuration with exactly
/// one target selects it; zero or several targets is an error.
pub fn select_target(
    config: &ProjectConfig,
    cli_target: Option<&str>,
) -> Result<ResolvedTarget, ConfigError> {
    match cli_target {
        Some(name) => resolve_target(config, name),
        None => {
            let names: Vec<&String> = config.targets.keys().collect();
            match names.as_slice() {
                [] => Err(ConfigError::AmbiguousTarget(
                    "no targets defined in kiln.toml; add a [targets.<name>] section".to_string(),
                )),
                [only] => resolve_target(config, only),
                _ => Err(ConfigError::AmbiguousTarget(format!(
                    "multiple targets defined ({}); choose one with --target",
                    names
                        .iter()
                        .map(|n| n.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))),
            }
        }
    }
}
