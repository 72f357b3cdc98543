//! Error types for engine runs.

use std::path::PathBuf;

use kiln_cache::CacheError;
use kiln_common::InternalError;
use kiln_config::ConfigError;
use kiln_index::IndexError;

/// A reason an engine run stopped without an outcome.
///
/// Compile, link and test failures are not errors: they are reported to the
/// sink and produce a failed outcome.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The project configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Indexing failed, for example on a missing or ambiguous entry file.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// The cache file could not be removed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A build directory or artifact could not be created or removed.
    #[error("cannot update {}: {source}", path.display())]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A bug in kiln.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl EngineError {
    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns `true` for errors that indicate a bug rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, EngineError::Internal(_))
    }
}
