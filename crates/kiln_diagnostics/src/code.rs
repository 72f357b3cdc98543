//! Diagnostic codes with category prefixes for structured error identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Error diagnostics, prefixed with `E`.
    Error,
    /// Warning diagnostics, prefixed with `W`.
    Warning,
    /// Progress and informational notes, prefixed with `N`.
    Note,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Note => 'N',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `E201`, `W101`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

/// Every code kiln emits.
pub mod codes {
    use super::{Category, DiagnosticCode};

    /// A source file or directory could not be read while indexing.
    pub const UNREADABLE_PATH: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);
    /// A configuration fragment adds or removes a flag illegally.
    pub const FLAG_CONFLICT: DiagnosticCode = DiagnosticCode::new(Category::Error, 102);
    /// A translation unit failed to compile.
    pub const COMPILE_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Error, 201);
    /// The link step failed.
    pub const LINK_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Error, 202);
    /// Symbols could not be read from a compiled object.
    pub const SYMBOLS_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Error, 203);
    /// A test executable exited unsuccessfully.
    pub const TEST_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Error, 204);
    /// The cache could not be written back.
    pub const CACHE_WRITE_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Error, 301);

    /// An include directive names a file that does not exist.
    pub const MISSING_INCLUDE: DiagnosticCode = DiagnosticCode::new(Category::Warning, 101);
    /// A file was skipped while indexing.
    pub const SKIPPED_PATH: DiagnosticCode = DiagnosticCode::new(Category::Warning, 102);
    /// A configuration fragment names a path that was not indexed.
    pub const UNMATCHED_FRAGMENT: DiagnosticCode = DiagnosticCode::new(Category::Warning, 103);
    /// The cache file was unreadable or malformed and has been discarded.
    pub const CORRUPT_CACHE: DiagnosticCode = DiagnosticCode::new(Category::Warning, 201);

    /// A translation unit is being compiled.
    pub const COMPILING: DiagnosticCode = DiagnosticCode::new(Category::Note, 1);
    /// The executable is being linked.
    pub const LINKING: DiagnosticCode = DiagnosticCode::new(Category::Note, 2);
    /// Nothing needed rebuilding.
    pub const UP_TO_DATE: DiagnosticCode = DiagnosticCode::new(Category::Note, 3);
    /// The cache was produced by another kiln version and has been ignored.
    pub const CACHE_VERSION: DiagnosticCode = DiagnosticCode::new(Category::Note, 4);
    /// Per-stage statistics.
    pub const STAGE: DiagnosticCode = DiagnosticCode::new(Category::Note, 5);
    /// A test executable is being run.
    pub const RUNNING_TEST: DiagnosticCode = DiagnosticCode::new(Category::Note, 6);
    /// A file is out of date (status reports).
    pub const OUT_OF_DATE: DiagnosticCode = DiagnosticCode::new(Category::Note, 7);
    /// A linked file references symbols no indexed file defines.
    pub const UNRESOLVED_SYMBOLS: DiagnosticCode = DiagnosticCode::new(Category::Note, 8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Error.prefix(), 'E');
        assert_eq!(Category::Warning.prefix(), 'W');
        assert_eq!(Category::Note.prefix(), 'N');
    }

    #[test]
    fn display_format() {
        let code = DiagnosticCode::new(Category::Error, 101);
        assert_eq!(format!("{code}"), "E101");

        let code = DiagnosticCode::new(Category::Warning, 3);
        assert_eq!(format!("{code}"), "W003");

        assert_eq!(format!("{}", codes::COMPILING), "N001");
    }

    #[test]
    fn serde_roundtrip() {
        let code = codes::MISSING_INCLUDE;
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
