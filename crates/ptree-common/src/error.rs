//! Error types for ptree.
//!
//! Every failure is fatal for the current invocation: nothing is retried.
//! Errors carry:
//! - Stable error codes for machine parsing
//! - Category classification (configuration vs. environment)
//! - Remediation hints for humans
//!
//! Degraded terminal capabilities (no terminfo entry, non-UTF-8 locale) are
//! not errors and never surface here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for ptree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or out-of-range command-line input.
    Config,
    /// Something about the host is missing (user, process table).
    Environment,
    /// Reading the process snapshot failed part-way.
    Collection,
    /// Writing output or reading fixture files failed.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Environment => write!(f, "environment"),
            ErrorCategory::Collection => write!(f, "collection"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for ptree.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("Number is invalid: \"{0}\"")]
    InvalidNumber(String),

    #[error("Number is too small: \"{0}\"")]
    NumberTooSmall(String),

    #[error("Number is too large: \"{0}\"")]
    NumberTooLarge(String),

    #[error("Invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // Environment errors (20-29)
    #[error("Unknown user: \"{0}\"")]
    UnknownUser(String),

    #[error("user database lookup failed: {0}")]
    UserLookup(String),

    #[error("cannot open process snapshot: {0}")]
    SnapshotUnavailable(String),

    // Collection errors (30-39)
    #[error("cannot read process snapshot: {0}")]
    SnapshotRead(String),

    // I/O errors (40-49)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Environment errors
    /// - 30-39: Collection errors
    /// - 40-49: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidNumber(_) => 11,
            Error::NumberTooSmall(_) => 12,
            Error::NumberTooLarge(_) => 13,
            Error::InvalidPattern { .. } => 14,
            Error::UnknownUser(_) => 20,
            Error::UserLookup(_) => 21,
            Error::SnapshotUnavailable(_) => 22,
            Error::SnapshotRead(_) => 30,
            Error::Io(_) => 40,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidNumber(_)
            | Error::NumberTooSmall(_)
            | Error::NumberTooLarge(_)
            | Error::InvalidPattern { .. } => ErrorCategory::Config,

            Error::UnknownUser(_) | Error::UserLookup(_) | Error::SnapshotUnavailable(_) => {
                ErrorCategory::Environment
            }

            Error::SnapshotRead(_) => ErrorCategory::Collection,

            Error::Io(_) => ErrorCategory::Io,
        }
    }

    /// Whether the usage summary should follow the error message.
    pub fn wants_usage(&self) -> bool {
        self.category() == ErrorCategory::Config
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Config => "Try 'ptree --help' for more information.",
            ErrorCategory::Environment => match self {
                Error::UnknownUser(_) => "Check the spelling, or pass a numeric PID instead.",
                _ => "Check that /proc is mounted and readable, or that ps is installed.",
            },
            ErrorCategory::Collection => "Retry the command; the process table changed while it was read.",
            ErrorCategory::Io => "Check that standard output is writable.",
        }
    }
}
