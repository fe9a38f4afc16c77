//! Packaging of tool outcomes into protocol results.
//!
//! Every outcome, success or failure, becomes a [`ToolResult`]. Failures are
//! results with `isError` set, carrying a short message and the client's
//! diagnostic stream when there is one.

use serde::Serialize;

use crate::error::RscurlError;
use crate::reducer::{MAX_RESPONSE_BYTES_LIMIT, ReducedResult};

/// One content item of a tool result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// The text payload.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text { text } => text,
        }
    }
}

/// The result of a `tools/call` invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<Content>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    /// Concatenated text of all content items, one per line.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(Content::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Describes what truncation removed from a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruncationNotice {
    pub truncated: bool,
    pub truncated_by_bytes: bool,
    pub truncated_structurally: bool,
    pub original_size: usize,
    pub max_response_bytes: usize,
    pub note: String,
    pub advice: String,
}

impl TruncationNotice {
    /// Builds the notice for `result`, or `None` if nothing was removed.
    pub fn for_result(result: &ReducedResult) -> Option<Self> {
        if !result.is_truncated() {
            return None;
        }

        let mut notes = Vec::new();
        if result.original_size > result.applied_limit {
            notes.push(format!(
                "Response truncated from {} bytes to the first {} bytes.",
                result.original_size, result.applied_limit
            ));
        }
        if result.decode_cut {
            notes.push(format!(
                "Invalid UTF-8 was replaced and the decoded text was cut to {} bytes.",
                result.applied_limit
            ));
        }
        if result.formatted_cut {
            notes.push(format!(
                "Formatted JSON still exceeded {} bytes after reduction and was cut as text.",
                result.structured_ceiling
            ));
        }
        if result.truncated_structurally() {
            notes.push(format!(
                "Parsed JSON was reduced to its leading entries because its formatted size \
                exceeded {} bytes.",
                result.structured_ceiling
            ));
        }

        Some(Self {
            truncated: true,
            truncated_by_bytes: result.truncated_by_bytes(),
            truncated_structurally: result.truncated_structurally(),
            original_size: result.original_size,
            max_response_bytes: result.applied_limit,
            note: notes.join(" "),
            advice: format!(
                "Adjust maxResponseBytes (1 to {}) to change how much of the response is kept, \
                or narrow the request (filters, pagination, fewer fields).",
                MAX_RESPONSE_BYTES_LIMIT
            ),
        })
    }
}

/// Error payload sent back in place of a response.
#[derive(Debug, Serialize)]
struct ErrorPayload<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stderr: Option<&'a str>,
}

/// Report returned by a successful download.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadReport {
    pub success: bool,
    pub output_path: String,
    pub message: String,
}

fn to_pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).expect("plain structs of strings and numbers serialize")
}

/// Encodes a bounded response.
///
/// The response text comes first; a [`TruncationNotice`] follows as a second
/// item when anything was removed.
pub fn encode_response(result: &ReducedResult) -> ToolResult {
    let mut content = vec![Content::text(result.text())];
    if let Some(notice) = TruncationNotice::for_result(result) {
        content.push(Content::text(to_pretty(&notice)));
    }
    ToolResult {
        content,
        is_error: false,
    }
}

/// Encodes a download report.
pub fn encode_download(report: &DownloadReport) -> ToolResult {
    ToolResult {
        content: vec![Content::text(to_pretty(report))],
        is_error: false,
    }
}

/// Encodes an error as `{"error": ..., "stderr": ...}` with `isError` set.
///
/// Only the error's `Display` text is used, never its debug form.
pub fn encode_error(err: &RscurlError) -> ToolResult {
    let payload = ErrorPayload {
        error: err.to_string(),
        stderr: err.stderr(),
    };
    ToolResult {
        content: vec![Content::text(to_pretty(&payload))],
        is_error: true,
    }
}
