//! Hashing primitives for table keys and configuration hashes.

use xxhash_rust::xxh3::{xxh3_64, Xxh3};

/// Computes the 64-bit table key for an arbitrary byte string.
///
/// Symbol names and normalized paths are stored in `kiln_table` containers
/// under this key. Two distinct inputs colliding are treated as the same key.
pub fn key_hash(data: &[u8]) -> u64 {
    xxh3_64(data)
}

/// Incremental XXH3 hasher for composing several fields into one 64-bit hash.
///
/// Every field is length-prefixed so that `["ab", "c"]` and `["a", "bc"]`
/// hash differently.
pub struct HashBuilder {
    state: Xxh3,
}

impl HashBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self { state: Xxh3::new() }
    }

    /// Mixes in a 64-bit integer.
    pub fn u64(mut self, value: u64) -> Self {
        self.state.update(&value.to_le_bytes());
        self
    }

    /// Mixes in a length-prefixed string.
    pub fn str(mut self, value: &str) -> Self {
        self.state.update(&(value.len() as u64).to_le_bytes());
        self.state.update(value.as_bytes());
        self
    }

    /// Mixes in a length-prefixed list of strings.
    pub fn strs<S: AsRef<str>>(mut self, values: &[S]) -> Self {
        self.state.update(&(values.len() as u64).to_le_bytes());
        for value in values {
            self = self.str(value.as_ref());
        }
        self
    }

    /// Returns the final 64-bit digest.
    pub fn finish(self) -> u64 {
        self.state.digest()
    }
}

impl Default for HashBuilder {
    fn default() -> Self {
        Self::new()
    }
}
