//! Real command executor implementation.
//!
//! This module provides [`RealCommandExecutor`], which runs commands with
//! `std::process::Command`, captures their output with a byte ceiling and
//! enforces a wall-clock timeout.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use wait_timeout::ChildExt;
use which::which;

use super::pipe::{BoundedCapture, StreamType, panic_message, read_pipe_bounded};
use super::{CapturedOutput, CommandExecutor, CommandSpec, STDERR_CAPTURE_LIMIT_BYTES};
use crate::error::RscurlError;

type ReaderHandle = JoinHandle<io::Result<BoundedCapture>>;

/// Cleans up a child process and its associated reader threads.
///
/// Kills the child, waits for it to terminate and joins all reader threads
/// so no process or thread outlives the invocation.
fn cleanup_child_process<I>(child: &mut Child, handles: I)
where
    I: IntoIterator<Item = ReaderHandle>,
{
    let pid = child.id();
    if let Err(e) = child.kill() {
        tracing::debug!(pid = pid, "kill returned error (process may have already exited): {}", e);
    }
    if let Err(e) = child.wait() {
        tracing::warn!(pid = pid, "failed to wait for child process after kill: {}", e);
    }
    for handle in handles {
        if let Err(e) = handle.join() {
            tracing::warn!("reader thread panicked during cleanup: {}", panic_message(&*e));
        }
    }
}

fn spawn_reader<R>(pipe: Option<R>, limit: usize, stream_type: StreamType) -> io::Result<ReaderHandle>
where
    R: io::Read + Send + 'static,
{
    thread::Builder::new()
        .name(format!("{}-reader", stream_type))
        .spawn(move || read_pipe_bounded(pipe, limit, stream_type))
}

/// Waits for the child, giving up after `timeout` if one is set.
///
/// Returns `Ok(None)` when the timeout elapsed with the child still running.
fn wait_for_exit(child: &mut Child, timeout: Option<Duration>) -> io::Result<Option<ExitStatus>> {
    match timeout {
        Some(timeout) => child.wait_timeout(timeout),
        None => child.wait().map(Some),
    }
}

fn execution_error(spec: &CommandSpec, status: impl Into<String>) -> RscurlError {
    RscurlError::Execution {
        command: spec.command.clone(),
        status: status.into(),
    }
}

/// Command executor that runs actual system commands.
///
/// When `dry_run` is true, the command line is logged but not executed,
/// and `execute()` returns an empty [`CapturedOutput`] with no status.
pub struct RealCommandExecutor {
    pub dry_run: bool,
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, spec: &CommandSpec) -> Result<CapturedOutput, RscurlError> {
        if self.dry_run {
            tracing::info!("dry run: {}", spec.command_line());
            return Ok(CapturedOutput::default());
        }

        let cmd = which(&spec.command).map_err(|_| RscurlError::CommandNotFound {
            command: spec.command.clone(),
        })?;
        tracing::trace!("command found: {}: {}", spec.command, cmd.to_string_lossy());

        let mut command = Command::new(cmd);
        command.args(&spec.args);
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .map_err(|e| execution_error(spec, format!("failed to spawn: {}", e)))?;

        tracing::trace!("spawned command: {}: pid={}", spec.command, child.id());

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let stdout_handle = match spawn_reader(stdout_pipe, spec.capture_limit, StreamType::Stdout)
        {
            Ok(handle) => handle,
            Err(e) => {
                cleanup_child_process(&mut child, []);
                return Err(execution_error(
                    spec,
                    format!("failed to spawn stdout reader thread: {}", e),
                ));
            }
        };

        let stderr_handle =
            match spawn_reader(stderr_pipe, STDERR_CAPTURE_LIMIT_BYTES, StreamType::Stderr) {
                Ok(handle) => handle,
                Err(e) => {
                    cleanup_child_process(&mut child, [stdout_handle]);
                    return Err(execution_error(
                        spec,
                        format!("failed to spawn stderr reader thread: {}", e),
                    ));
                }
            };

        let status = match wait_for_exit(&mut child, spec.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                tracing::warn!(pid = child.id(), "{} exceeded its timeout, killing it", spec.command);
                cleanup_child_process(&mut child, [stdout_handle, stderr_handle]);
                return Err(RscurlError::ProcessTimeout {
                    command: spec.command.clone(),
                    timeout_secs: spec.timeout.map(|t| t.as_secs()).unwrap_or_default(),
                });
            }
            Err(e) => {
                // The process might still be running; kill it before bailing out.
                cleanup_child_process(&mut child, [stdout_handle, stderr_handle]);
                return Err(execution_error(spec, format!("failed to wait for command: {}", e)));
            }
        };

        let stdout = match stdout_handle.join() {
            Ok(Ok(capture)) => capture,
            Ok(Err(e)) => {
                let _ = stderr_handle.join();
                return Err(execution_error(spec, format!("failed to read stdout: {}", e)));
            }
            Err(e) => {
                let _ = stderr_handle.join();
                return Err(execution_error(
                    spec,
                    format!("stdout reader thread panicked: {}", panic_message(&*e)),
                ));
            }
        };

        // stderr is diagnostic only; losing it never fails the invocation.
        let stderr = match stderr_handle.join() {
            Ok(Ok(capture)) => String::from_utf8_lossy(&capture.bytes).into_owned(),
            Ok(Err(e)) => {
                tracing::warn!(stream = "stderr", error = %e, "I/O error, diagnostics lost");
                String::new()
            }
            Err(e) => {
                tracing::warn!(stream = "stderr", panic = panic_message(&*e), "reader thread panicked");
                String::new()
            }
        };

        tracing::trace!(
            "executed command: {}: success={} stdout_bytes={}",
            spec.command,
            status.success(),
            stdout.total
        );

        Ok(CapturedOutput {
            raw_bytes: stdout.bytes,
            byte_length: stdout.total,
            stderr,
            status: Some(status),
        })
    }
}
