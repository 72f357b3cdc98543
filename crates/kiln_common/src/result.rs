//! Internal error type for invariant violations.

/// The result type for operations that can only fail through a bug in kiln.
///
/// `Err` never describes a user mistake: those are reported through the
/// diagnostic sink and the operation continues. An `InternalError` aborts
/// the run.
pub type KilnResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in kiln, not a user input problem.
///
/// Examples are a graph edge naming a node that was never added, or an arena
/// index that does not belong to the file tree.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("edge to unknown node 7");
        assert_eq!(format!("{err}"), "internal error: edge to unknown node 7");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }
}
