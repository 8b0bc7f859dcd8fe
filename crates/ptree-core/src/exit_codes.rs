//! Exit codes for the ptree CLI.
//!
//! The process status is deliberately coarse: 0 when the tree was printed
//! (or help/version was requested), 1 for every failure. The variants keep
//! the failure category so that logs and tests can tell them apart.

use ptree_common::{Error, ErrorCategory};

/// Outcome of one ptree invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Tree printed, or help/version shown.
    Success,

    /// Invalid option, invalid number, or bad pattern.
    ArgsError,

    /// Unknown user, or the process snapshot could not be opened.
    EnvironmentError,

    /// The process snapshot failed part-way through.
    CollectionError,

    /// Writing the tree failed.
    IoError,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            _ => 1,
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Success
    }

    /// Get the code name as a string constant (for structured logs).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Success => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::EnvironmentError => "ERR_ENVIRONMENT",
            ExitCode::CollectionError => "ERR_COLLECTION",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Config => ExitCode::ArgsError,
            ErrorCategory::Environment => ExitCode::EnvironmentError,
            ErrorCategory::Collection => ExitCode::CollectionError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
