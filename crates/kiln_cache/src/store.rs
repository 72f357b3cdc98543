//! Reading and writing a target's cache file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use kiln_diagnostics::{codes, Diagnostic, DiagnosticSink};

use crate::document::{CacheDocument, CACHE_VERSION};
use crate::error::CacheError;
use crate::snapshot::CacheSnapshot;

/// The cache file of one target.
#[derive(Clone, Debug)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// A store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the previous run's cache.
    ///
    /// This is fail-safe: a missing file returns `None` quietly, an unreadable
    /// or malformed file is reported as a warning and a cache from another
    /// kiln version as a note, and all of them return `None`, triggering a
    /// full rebuild.
    pub fn load(&self, sink: &DiagnosticSink) -> Option<CacheSnapshot> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                self.discard(sink, format!("cannot read cache: {err}"));
                return None;
            }
        };
        let document = match CacheDocument::parse(&text) {
            Ok(document) => document,
            Err(err) => {
                self.discard(sink, err.to_string());
                return None;
            }
        };
        if document.version != CACHE_VERSION {
            sink.emit(
                Diagnostic::note(
                    codes::CACHE_VERSION,
                    format!(
                        "cache written by kiln {} (this is {CACHE_VERSION}); rebuilding",
                        document.version
                    ),
                )
                .with_path(&self.path),
            );
            return None;
        }
        let snapshot = CacheSnapshot::from_document(document);
        tracing::debug!(path = %self.path.display(), entries = snapshot.len(), "loaded cache");
        Some(snapshot)
    }

    /// Writes `document`, replacing the previous cache.
    ///
    /// Creates the parent directory if it doesn't exist. The file is written
    /// next to the old one and renamed over it.
    pub fn save(&self, document: &CacheDocument) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = document.render()?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|e| CacheError::Io {
            path: staging.clone(),
            source: e,
        })?;
        fs::rename(&staging, &self.path).map_err(|e| CacheError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Deletes the cache file. Returns `false` if there was none.
    pub fn remove(&self) -> Result<bool, CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(CacheError::Io {
                path: self.path.clone(),
                source: err,
            }),
        }
    }

    fn discard(&self, sink: &DiagnosticSink, reason: String) {
        sink.emit(
            Diagnostic::warning(codes::CORRUPT_CACHE, "discarding unusable cache")
                .with_path(&self.path)
                .with_note(reason)
                .with_note("every file will be rebuilt"),
        );
    }
}
