//! Shared foundational types used across the kiln build engine.
//!
//! This crate provides filesystem identities and modification times for project
//! files, the hashing primitives used by the associative container and the
//! configuration hash, and the internal error type for invariant violations.

#![warn(missing_docs)]

pub mod file_id;
pub mod hash;
pub mod path;
pub mod result;

pub use file_id::{FileId, MTime};
pub use hash::{key_hash, HashBuilder};
pub use path::{normalize, path_key};
pub use result::{InternalError, KilnResult};
