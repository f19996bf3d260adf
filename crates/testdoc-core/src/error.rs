//! Error types and error code constants for testdoc.
//!
//! This module provides a unified error type (`TestDocError`) that bridges
//! domain-specific errors from different subsystems (file discovery, result
//! parsing, configuration) into a common format suitable for CLI output.
//!
//! ## Error Code Mapping
//!
//! Exit codes:
//! - `2`: Invalid arguments or configuration
//! - `3`: Resolution errors (source root missing, not inside a Go module)
//! - `4`: Output errors (report could not be written)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! Only fatal conditions become a `TestDocError`. A single unparsable test
//! file or an unreadable results file is logged and absorbed by the caller.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes, used as process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller, or an invalid configuration file.
    InvalidArguments = 2,
    /// The source tree could not be resolved.
    ResolutionError = 3,
    /// The report could not be written.
    OutputError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the CLI.
#[derive(Debug, Error)]
pub enum TestDocError {
    /// Configuration file could not be read or parsed.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Source root does not exist or is not a directory.
    #[error("source root not found: {path}")]
    RootNotFound { path: String },

    /// Source root is not inside a Go module.
    #[error("no go.mod found for {path} or any parent directory")]
    ModuleNotFound { path: String },

    /// Report output could not be written.
    #[error("failed to write {path}: {message}")]
    Output { path: String, message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&TestDocError> for OutputErrorCode {
    fn from(err: &TestDocError) -> Self {
        match err {
            TestDocError::Config { .. } => OutputErrorCode::InvalidArguments,
            TestDocError::RootNotFound { .. } => OutputErrorCode::ResolutionError,
            TestDocError::ModuleNotFound { .. } => OutputErrorCode::ResolutionError,
            TestDocError::Output { .. } => OutputErrorCode::OutputError,
            TestDocError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<TestDocError> for OutputErrorCode {
    fn from(err: TestDocError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl TestDocError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        TestDocError::Config {
            message: message.into(),
        }
    }

    /// Create an output error for the given path.
    pub fn output(path: impl Into<String>, message: impl Into<String>) -> Self {
        TestDocError::Output {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        TestDocError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}
