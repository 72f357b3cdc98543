//! The per-target build cache.
//!
//! After every run the whole [`FileTree`](kiln_index::FileTree) is written as
//! one JSON [`CacheDocument`] whose shape depends on each file's role. The
//! next run loads it into a [`CacheSnapshot`] keyed by file identity and
//! reuses include and symbol sets of files whose configuration hash still
//! matches. A missing, corrupt or foreign-version cache is discarded and the
//! target is rebuilt from scratch.

#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod snapshot;
pub mod store;

pub use document::{
    CacheDocument, CachedDirectory, CachedFile, CachedImplementation, CachedInterface, CachedTest,
    CACHE_VERSION,
};
pub use error::CacheError;
pub use snapshot::{CacheEntry, CacheSnapshot};
pub use store::CacheStore;
