//! Internal utilities for capturing command output with a byte ceiling.
//!
//! Each pipe is drained to EOF on its own thread so the child never blocks
//! on a full pipe, but only the leading bytes up to the limit are kept.

use std::io::{self, Read};

/// Type of output stream for logging purposes.
#[derive(Clone, Copy)]
pub(super) enum StreamType {
    Stdout,
    Stderr,
}

impl std::fmt::Display for StreamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Bytes kept from a pipe plus the total read from it.
#[derive(Debug, Default)]
pub(super) struct BoundedCapture {
    pub bytes: Vec<u8>,
    pub total: usize,
}

/// Extracts a human-readable message from a thread panic.
///
/// The returned `&str` borrows from the panic payload, so it is valid
/// as long as the `err` reference is valid.
pub(super) fn panic_message(err: &(dyn std::any::Any + Send)) -> &str {
    err.downcast_ref::<&str>()
        .copied()
        .or_else(|| err.downcast_ref::<String>().map(|s| s.as_str()))
        .unwrap_or("unknown panic")
}

/// Reads a pipe to EOF, keeping at most `limit` bytes.
///
/// - Bytes past the limit are counted and discarded
/// - `Interrupted` reads are retried
/// - `None` pipe is an error (unexpected if `Stdio::piped()` was set)
pub(super) fn read_pipe_bounded<R: Read>(
    pipe: Option<R>,
    limit: usize,
    stream_type: StreamType,
) -> io::Result<BoundedCapture> {
    let Some(mut pipe) = pipe else {
        return Err(io::Error::other(format!(
            "{} pipe was None (unexpected: Stdio::piped() was set)",
            stream_type
        )));
    };

    let mut capture = BoundedCapture::default();
    let mut chunk = [0u8; 8192];

    loop {
        let n = match pipe.read(&mut chunk) {
            Ok(0) => break, // EOF
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let room = limit.saturating_sub(capture.bytes.len());
        capture.bytes.extend_from_slice(&chunk[..n.min(room)]);
        capture.total += n;
    }

    if capture.total > capture.bytes.len() {
        tracing::debug!(
            stream = %stream_type,
            kept = capture.bytes.len(),
            total = capture.total,
            "capture limit reached, discarded the remainder"
        );
    }

    Ok(capture)
}
