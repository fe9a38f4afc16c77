//! Command execution abstraction for rscurl.
//!
//! This module provides:
//! - [`CommandSpec`]: Specification for commands to execute
//! - [`CapturedOutput`]: Bounded capture of a finished command
//! - [`CommandExecutor`]: Trait for command execution strategies
//! - [`RealCommandExecutor`]: Production implementation using `std::process::Command`

mod pipe;
mod real;

use std::process::ExitStatus;
use std::time::Duration;

use crate::error::RscurlError;
use crate::reducer::MAX_RESPONSE_BYTES_LIMIT;

pub use real::RealCommandExecutor;

/// Absolute ceiling on captured stdout bytes.
///
/// Ten times the largest accepted `maxResponseBytes`, so the byte budget is
/// always applied in-process on real data rather than lost at the pipe.
pub const CAPTURE_LIMIT_BYTES: usize = 10 * MAX_RESPONSE_BYTES_LIMIT;

/// Ceiling on captured stderr bytes.
pub const STDERR_CAPTURE_LIMIT_BYTES: usize = 64 * 1024;

/// Specification for a command to be executed
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The command to execute (e.g., "curl")
    pub command: String,
    /// Command arguments, passed to the child verbatim
    pub args: Vec<String>,
    /// Kill the child once this much time has passed
    pub timeout: Option<Duration>,
    /// Maximum stdout bytes kept in memory
    pub capture_limit: usize,
}

impl CommandSpec {
    /// Creates a new CommandSpec with command and args
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: None,
            capture_limit: CAPTURE_LIMIT_BYTES,
        }
    }

    /// Sets the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Lowers the stdout capture limit. Values above [`CAPTURE_LIMIT_BYTES`]
    /// are clamped.
    #[must_use]
    pub fn with_capture_limit(mut self, limit: usize) -> Self {
        self.capture_limit = limit.min(CAPTURE_LIMIT_BYTES);
        self
    }

    /// Shell-quoted rendering for logs.
    pub fn command_line(&self) -> String {
        crate::command::render_command_line(&self.command, &self.args)
    }
}

/// Output captured from a finished command.
#[derive(Debug, Default)]
pub struct CapturedOutput {
    /// Leading stdout bytes, at most the command's capture limit.
    pub raw_bytes: Vec<u8>,
    /// Total stdout bytes the child produced, including any not kept.
    pub byte_length: usize,
    /// Diagnostic stream, lossily decoded.
    pub stderr: String,
    /// Exit status of the command (None in dry-run mode)
    pub status: Option<ExitStatus>,
}

impl CapturedOutput {
    /// Returns true if the command exited successfully.
    ///
    /// In dry-run mode (status is None), this always returns true.
    pub fn success(&self) -> bool {
        self.status.is_none_or(|s| s.success())
    }

    /// Returns the exit code if available
    pub fn code(&self) -> Option<i32> {
        self.status.and_then(|s| s.code())
    }

    /// Describes an unsuccessful exit, e.g. `exit status: 6`.
    pub fn exit_error(&self) -> Option<String> {
        self.status.filter(|s| !s.success()).map(|s| s.to_string())
    }

    /// Returns true if stdout had more bytes than were kept.
    pub fn capture_truncated(&self) -> bool {
        self.byte_length > self.raw_bytes.len()
    }

    /// Converts a failed run into an error, unless it produced output.
    ///
    /// A nonzero exit or stderr text alongside stdout data is logged and the
    /// output kept. Only a failure with empty stdout becomes
    /// [`RscurlError::ProcessFailure`], carrying the child's stderr verbatim.
    pub fn require_output(self, command: &str) -> Result<Self, RscurlError> {
        let Some(exit) = self.exit_error() else {
            return Ok(self);
        };
        if !self.raw_bytes.is_empty() {
            tracing::warn!(command, exit = %exit, "command failed but produced output; keeping it");
            return Ok(self);
        }

        let diagnostic = self.stderr.trim();
        let message = if diagnostic.is_empty() {
            format!("{} failed with {}", command, exit)
        } else {
            diagnostic.to_string()
        };
        Err(RscurlError::ProcessFailure {
            message,
            stderr: (!diagnostic.is_empty()).then_some(self.stderr),
        })
    }
}

/// Trait for command execution.
///
/// Implementations must be `Send + Sync` so one executor can serve several
/// invocations at once; each call owns its own child and buffers.
pub trait CommandExecutor: Send + Sync {
    /// Executes a command with the given specification.
    fn execute(&self, spec: &CommandSpec) -> Result<CapturedOutput, RscurlError>;
}
