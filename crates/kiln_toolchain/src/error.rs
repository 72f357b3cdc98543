//! Error types for running external tools.

use std::path::PathBuf;

/// Failure to run a tool at all.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The executable could not be found.
    #[error("`{tool}` not found: {message}")]
    NotFound {
        /// The executable name.
        tool: String,
        /// The OS error message.
        message: String,
    },

    /// The executable could not be started or waited for.
    #[error("failed to run `{tool}`: {message}")]
    Spawn {
        /// The executable name.
        tool: String,
        /// The OS error message.
        message: String,
    },

    /// The symbol reader failed on an object.
    #[error("cannot read symbols of {}: {message}", object.display())]
    Symbols {
        /// The object file.
        object: PathBuf,
        /// What went wrong, including the tool's stderr.
        message: String,
    },
}

impl ToolError {
    pub(crate) fn spawn(tool: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ToolError::NotFound {
                tool: tool.to_string(),
                message: err.to_string(),
            }
        } else {
            ToolError::Spawn {
                tool: tool.to_string(),
                message: err.to_string(),
            }
        }
    }
}
