use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::Mutex;

use rscurl::RscurlError;
use rscurl::executor::{CapturedOutput, CommandExecutor, CommandSpec};

/// Canned outcome returned by [`RecordingExecutor`].
#[allow(dead_code)]
pub enum Canned {
    Output {
        stdout: Vec<u8>,
        stderr: String,
        exit_code: i32,
    },
    Timeout,
}

/// Executor that records every spec it is given and returns a canned outcome
/// instead of spawning anything.
pub struct RecordingExecutor {
    canned: Canned,
    calls: Mutex<Vec<CommandSpec>>,
}

#[allow(dead_code)]
impl RecordingExecutor {
    pub fn new(canned: Canned) -> Self {
        Self {
            canned,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Succeeds with `stdout` and exit code 0.
    pub fn returning(stdout: impl Into<Vec<u8>>) -> Self {
        Self::new(Canned::Output {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        })
    }

    /// Fails with `stderr` and `exit_code`, producing no stdout.
    pub fn failing(stderr: impl Into<String>, exit_code: i32) -> Self {
        Self::new(Canned::Output {
            stdout: Vec::new(),
            stderr: stderr.into(),
            exit_code,
        })
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Arguments of the only recorded call.
    ///
    /// # Panics
    /// Panics unless exactly one call was recorded.
    pub fn single_args(&self) -> Vec<String> {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one call, got {}", calls.len());
        calls[0].args.clone()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, spec: &CommandSpec) -> Result<CapturedOutput, RscurlError> {
        self.calls.lock().unwrap().push(spec.clone());
        match &self.canned {
            Canned::Output {
                stdout,
                stderr,
                exit_code,
            } => Ok(CapturedOutput {
                raw_bytes: stdout.clone(),
                byte_length: stdout.len(),
                stderr: stderr.clone(),
                status: Some(ExitStatus::from_raw(exit_code << 8)),
            }),
            Canned::Timeout => Err(RscurlError::ProcessTimeout {
                command: spec.command.clone(),
                timeout_secs: spec.timeout.map(|t| t.as_secs()).unwrap_or_default(),
            }),
        }
    }
}

/// Returns the value following `flag` in `args`, if present.
#[allow(dead_code)]
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}
