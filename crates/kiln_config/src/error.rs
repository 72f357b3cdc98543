//! Error types for configuration loading and flag composition.

use crate::fragment::FlagKind;

/// Errors that can occur when loading or validating a `kiln.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// No `kiln.toml` was found in the directory or any parent.
    #[error("could not find kiln.toml in {0} or any parent directory")]
    NoProjectRoot(String),

    /// A referenced target name does not exist in the configuration.
    #[error("unknown target '{0}'")]
    UnknownTarget(String),

    /// No target was named and the configuration does not define exactly one.
    #[error("{0}")]
    AmbiguousTarget(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

/// An illegal flag addition or removal found while composing fragments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlagError {
    /// The same fragment adds a flag twice.
    #[error("{kind} flag `{flag}` is added twice by the same fragment")]
    DuplicateAdd {
        /// Which flag list.
        kind: FlagKind,
        /// The offending flag.
        flag: String,
    },

    /// The same fragment removes a flag twice.
    #[error("{kind} flag `{flag}` is removed twice by the same fragment")]
    DuplicateRemove {
        /// Which flag list.
        kind: FlagKind,
        /// The offending flag.
        flag: String,
    },

    /// The same fragment both adds and removes a flag.
    #[error("{kind} flag `{flag}` is both added and removed by the same fragment")]
    AddedAndRemoved {
        /// Which flag list.
        kind: FlagKind,
        /// The offending flag.
        flag: String,
    },

    /// A fragment adds a flag that an ancestor removed.
    #[error("{kind} flag `{flag}` was removed by an ancestor and cannot be added back")]
    AddAfterRemove {
        /// Which flag list.
        kind: FlagKind,
        /// The offending flag.
        flag: String,
    },

    /// A fragment adds a flag that is already inherited.
    #[error("{kind} flag `{flag}` is already added by an ancestor")]
    AlreadyAdded {
        /// Which flag list.
        kind: FlagKind,
        /// The offending flag.
        flag: String,
    },
}
