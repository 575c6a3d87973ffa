//! Error types for the waypath core.

use std::fmt;
use std::path::PathBuf;

/// Result type for waypath operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or stepping a drive session.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A per-frame input violated its contract.
    InvalidInput {
        /// Where the input was rejected.
        context: &'static str,
        /// Description of what was invalid.
        detail: String,
    },
    /// A physics or camera constant is malformed.
    Configuration {
        /// The offending field.
        field: &'static str,
        /// Description of the problem.
        detail: String,
    },
    /// A config file could not be read or parsed.
    ConfigFile {
        /// The file being loaded.
        path: PathBuf,
        /// Underlying I/O or JSON error.
        detail: String,
    },
}

impl Error {
    pub(crate) fn invalid_input(context: &'static str, detail: impl Into<String>) -> Self {
        Error::InvalidInput {
            context,
            detail: detail.into(),
        }
    }

    pub(crate) fn configuration(field: &'static str, detail: impl Into<String>) -> Self {
        Error::Configuration {
            field,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput { context, detail } => {
                write!(f, "invalid input to {context}: {detail}")
            }
            Error::Configuration { field, detail } => {
                write!(f, "invalid configuration for {field}: {detail}")
            }
            Error::ConfigFile { path, detail } => {
                write!(f, "failed to load {}: {detail}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {}
