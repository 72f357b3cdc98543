//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::{Path, PathBuf};

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Walks up from `start` looking for the nearest directory containing `kiln.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, ConfigError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ConfigError::NoProjectRoot(start.display().to_string()));
        }
    }
}

/// Loads and validates a `kiln.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `kiln.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.build_dir.is_empty() {
        return Err(ConfigError::MissingField("project.build_dir".to_string()));
    }
    for (name, target) in &config.targets {
        if target.entry.is_empty() {
            return Err(ConfigError::MissingField(format!("targets.{name}.entry")));
        }
        if target.compiler.is_empty() || target.linker.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "target '{name}' needs a non-empty compiler and linker"
            )));
        }
    }
    for (name, spec) in &config.compilers {
        if spec.sources.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "compiler '{name}' registers no source extensions"
            )));
        }
    }
    Ok(())
}
