//! Domain-specific error types for rscurl.
//!
//! This module defines `RscurlError`, a `thiserror`-based enum that
//! provides typed error variants for every failure a tool invocation can
//! hit. Library functions return `Result<T, RscurlError>` so the encoder can
//! turn each variant into a short diagnostic, while the binary and CLI
//! boundary continue to use `anyhow::Result`.
//!
//! A response that is not JSON is not an error: the reducer degrades to
//! plain text without going through this type.

use std::io;

/// Formats an IO error kind into a human-readable message.
///
/// Gives consistent messages for common IO error kinds (e.g.
/// "I/O error: not found") instead of the OS-level text. Unrecognized
/// kinds fall back to the underlying error message.
pub(crate) fn io_error_kind_message(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "I/O error: not found".to_string(),
        io::ErrorKind::PermissionDenied => "I/O error: permission denied".to_string(),
        io::ErrorKind::IsADirectory => "I/O error: is a directory".to_string(),
        _ => format!("I/O error: {}", err),
    }
}

/// Domain-specific error type for rscurl.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RscurlError {
    /// The URL could not be parsed as an absolute http(s) URI.
    ///
    /// Always raised before any process is spawned.
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP method is outside the supported set.
    #[error("invalid method '{0}': expected one of GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS")]
    InvalidMethod(String),

    /// A request constraint was violated (header syntax, limits, paths).
    #[error("validation error: {0}")]
    Validation(String),

    /// The external client executable could not be located.
    #[error("command not found in PATH: {command}")]
    CommandNotFound { command: String },

    /// The child process exceeded its time budget and was terminated.
    #[error("{command} timed out after {timeout_secs} seconds")]
    ProcessTimeout { command: String, timeout_secs: u64 },

    /// The child process failed without producing any output.
    ///
    /// `message` carries the client's own diagnostic verbatim when it wrote
    /// one (e.g. `curl: (6) Could not resolve host: example.invalid`).
    #[error("{message}")]
    ProcessFailure {
        message: String,
        stderr: Option<String>,
    },

    /// Spawning, waiting on, or reading from the child failed internally.
    #[error("command execution failed: {command}: {status}")]
    Execution {
        /// The command that was executed.
        command: String,
        /// Human-readable reason for the failure.
        status: String,
    },

    /// A configuration file could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O operation failed with contextual information.
    #[error("{context}: {message}")]
    Io {
        /// What was being done when the error occurred.
        context: String,
        /// Derived from [`io_error_kind_message`].
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl RscurlError {
    /// Creates an `Io` variant with the `message` field derived from `source`.
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            message: io_error_kind_message(&source),
            source,
        }
    }

    /// Returns the diagnostic stream captured from the child, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ProcessFailure { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}
