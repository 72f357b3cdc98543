//! How serious a diagnostic is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity of a diagnostic. Variants compare in declaration order, so
/// `Debug < Note < Warning < Error`; verbosity filtering relies on that.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Detail only shown in verbose runs.
    Debug,
    /// Progress and informational output.
    Note,
    /// A problem that was worked around; the build continues.
    Warning,
    /// A problem that makes the build fail.
    Error,
}

impl Severity {
    /// Returns `true` for [`Error`](Severity::Error), the only severity that fails a run.
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Severity::Debug < Severity::Note);
        assert!(Severity::Note < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn only_errors_fail() {
        assert!(Severity::Error.is_error());
        assert!(!Severity::Warning.is_error());
        assert!(!Severity::Debug.is_error());
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Severity::Error), "error");
        assert_eq!(format!("{}", Severity::Warning), "warning");
        assert_eq!(format!("{}", Severity::Note), "note");
        assert_eq!(format!("{}", Severity::Debug), "debug");
    }
}
