//! Error types for enrichmail.
//!
//! Library crates use [`EnrichmailError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all enrichmail operations.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmailError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed or unreadable input table (CSV/XLSX parsing).
    #[error("input error: {message}")]
    Input { message: String },

    /// Transport-level error talking to the verification endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered, but with a body we could not decode.
    #[error("provider error: {0}")]
    Provider(String),

    /// Run-level verification failure (e.g., endpoint unreachable for
    /// every address in the batch).
    #[error("verification error: {0}")]
    Verification(String),

    /// Workbook assembly or serialization error.
    #[error("report error: {0}")]
    Report(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The run was cancelled between verification calls.
    #[error("run cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EnrichmailError>;

impl EnrichmailError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an input error from any displayable message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = EnrichmailError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = EnrichmailError::input("first row has no headers");
        assert!(err.to_string().contains("no headers"));

        let err = EnrichmailError::Cancelled;
        assert_eq!(err.to_string(), "run cancelled");
    }
}
