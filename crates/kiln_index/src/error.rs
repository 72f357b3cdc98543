//! Error types for indexing.

use std::path::PathBuf;

/// Fatal errors that stop indexing.
///
/// Unreadable entries below the root are not errors: they are reported as
/// warnings and skipped.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The target root could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The target root exists but is not a directory.
    #[error("target root {0} is not a directory")]
    NotADirectory(PathBuf),

    /// No implementation file matches the entry suffix.
    #[error("no source file matches entry `{0}`")]
    EntryNotFound(String),

    /// Several implementation files match the entry suffix.
    #[error("entry `{entry}` is ambiguous: matches {}", format_candidates(.candidates))]
    AmbiguousEntry {
        /// The configured entry suffix.
        entry: String,
        /// Every matching path.
        candidates: Vec<PathBuf>,
    },
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
