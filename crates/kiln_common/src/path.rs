//! Lexical path helpers.

use crate::hash::key_hash;
use std::path::{Component, Path, PathBuf};

/// Resolves `.` and `..` components without touching the filesystem.
///
/// A `..` that would climb above the start of a relative path is kept, so
/// `../shared/a.h` stays as written.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Table key of a path after [`normalize`].
pub fn path_key(path: &Path) -> u64 {
    key_hash(normalize(path).as_os_str().as_encoded_bytes())
}
