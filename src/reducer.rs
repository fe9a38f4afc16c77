//! Two-stage bounding of captured responses.
//!
//! Stage one cuts the raw bytes at `max_response_bytes` before anything is
//! parsed. Stage two applies after a successful JSON parse: if the
//! pretty-printed value is longer than the structured text ceiling, arrays
//! and objects are cut to their first [`STRUCTURAL_KEEP`] entries. A byte
//! prefix of valid JSON usually fails to parse; that is the expected
//! fallback to plain text, not an error.

use serde_json::Value;

/// Byte budget applied when the caller does not set `maxResponseBytes`.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 800_000;

/// Largest `maxResponseBytes` a caller may request.
pub const MAX_RESPONSE_BYTES_LIMIT: usize = 1_000_000;

/// Largest formatted JSON text returned before structural truncation.
pub const STRUCTURED_TEXT_CEILING: usize = 1_000_000;

/// Elements or entries kept by structural truncation.
pub const STRUCTURAL_KEEP: usize = 100;

/// Limits for the structural stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReducerLimits {
    pub structured_text_ceiling: usize,
    pub structural_keep: usize,
}

impl Default for ReducerLimits {
    fn default() -> Self {
        Self {
            structured_text_ceiling: STRUCTURED_TEXT_CEILING,
            structural_keep: STRUCTURAL_KEEP,
        }
    }
}

/// Outcome of trying to read text as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Json(Value),
    NotJson,
}

/// Parses `text` as JSON without treating failure as an error.
pub fn parse_json(text: &str) -> Parsed {
    match serde_json::from_str(text) {
        Ok(value) => Parsed::Json(value),
        Err(_) => Parsed::NotJson,
    }
}

/// The response body after bounding.
#[derive(Debug, Clone, PartialEq)]
pub enum ReducedBody {
    /// Parsed JSON; `text` is its final pretty-printed form.
    Structured {
        value: Value,
        text: String,
        truncated_by_bytes: bool,
        truncated_structurally: bool,
    },
    /// Anything that did not parse, verbatim up to the byte budget. Also
    /// formatted JSON cut at the ceiling, which may have been reduced first.
    PlainText {
        text: String,
        truncated_by_bytes: bool,
        truncated_structurally: bool,
    },
}

/// A bounded response with the figures needed to describe any truncation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedResult {
    pub body: ReducedBody,
    /// Bytes the client produced before any truncation.
    pub original_size: usize,
    /// The `maxResponseBytes` in force.
    pub applied_limit: usize,
    /// The structured ceiling in force.
    pub structured_ceiling: usize,
    /// Formatted JSON was still over the ceiling after reduction and was
    /// cut as plain text.
    pub formatted_cut: bool,
    /// Replacement characters for invalid UTF-8 pushed the decoded text past
    /// the byte budget, so its tail was dropped.
    pub decode_cut: bool,
}

impl ReducedResult {
    /// Final response text.
    pub fn text(&self) -> &str {
        match &self.body {
            ReducedBody::Structured { text, .. } | ReducedBody::PlainText { text, .. } => text,
        }
    }

    pub fn truncated_by_bytes(&self) -> bool {
        match self.body {
            ReducedBody::Structured { truncated_by_bytes, .. }
            | ReducedBody::PlainText { truncated_by_bytes, .. } => truncated_by_bytes,
        }
    }

    pub fn truncated_structurally(&self) -> bool {
        match self.body {
            ReducedBody::Structured { truncated_structurally, .. }
            | ReducedBody::PlainText { truncated_structurally, .. } => truncated_structurally,
        }
    }

    /// True when either stage removed data.
    pub fn is_truncated(&self) -> bool {
        self.truncated_by_bytes() || self.truncated_structurally()
    }
}

/// Length of the longest prefix of `bytes` that does not end inside a
/// partial UTF-8 sequence.
fn complete_utf8_prefix(bytes: &[u8]) -> usize {
    match std::str::from_utf8(bytes) {
        Ok(_) => bytes.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => bytes.len(),
    }
}

/// Cuts `text` to at most `limit` bytes on a char boundary.
fn truncate_on_char_boundary(mut text: String, limit: usize) -> String {
    if text.len() > limit {
        let mut end = limit;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

/// Decodes `bytes` lossily, never returning more than `limit` bytes of text.
///
/// Invalid sequences become U+FFFD, which can be longer than the bytes it
/// replaces, so the decoded text is cut again after conversion. A trailing
/// partial sequence is dropped only when `at_cut`, since then it is an
/// artifact of the byte budget. The flag reports whether decoded text was
/// lost to the second cut.
fn decode_within(bytes: &[u8], limit: usize, at_cut: bool) -> (String, bool) {
    let bytes = if at_cut { &bytes[..complete_utf8_prefix(bytes)] } else { bytes };
    let decoded = String::from_utf8_lossy(bytes).into_owned();
    let decoded_len = decoded.len();
    let text = truncate_on_char_boundary(decoded, limit);
    let lost = text.len() < decoded_len;
    (text, lost)
}

/// Keeps the first `keep` elements of an array or entries of an object.
///
/// Object entries keep their original order. Returns whether anything was
/// removed; scalars are never reduced.
fn reduce_structure(value: Value, keep: usize) -> (Value, bool) {
    match value {
        Value::Array(mut items) if items.len() > keep => {
            items.truncate(keep);
            (Value::Array(items), true)
        }
        Value::Object(map) if map.len() > keep => {
            (Value::Object(map.into_iter().take(keep).collect()), true)
        }
        other => (other, false),
    }
}

fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).expect("a Value with string keys always serializes")
}

/// Bounds a captured response.
///
/// `raw` holds the leading captured bytes and `original_size` the total the
/// client produced (it may exceed `raw.len()` when capture itself was
/// capped).
pub fn reduce(
    raw: &[u8],
    original_size: usize,
    max_response_bytes: usize,
    limits: &ReducerLimits,
) -> ReducedResult {
    let over_budget = original_size > max_response_bytes;
    let kept = &raw[..raw.len().min(max_response_bytes)];
    let (text, decode_cut) = decode_within(kept, max_response_bytes, over_budget);
    let truncated_by_bytes = over_budget || decode_cut;

    tracing::debug!(
        original_size,
        max_response_bytes,
        truncated_by_bytes,
        decode_cut,
        "applied byte budget"
    );

    let mut formatted_cut = false;
    let body = match parse_json(&text) {
        Parsed::NotJson => {
            tracing::debug!("response is not JSON, returning plain text");
            ReducedBody::PlainText {
                text,
                truncated_by_bytes,
                truncated_structurally: false,
            }
        }
        Parsed::Json(value) => {
            let pretty = to_pretty(&value);
            if pretty.len() <= limits.structured_text_ceiling {
                ReducedBody::Structured {
                    value,
                    text: pretty,
                    truncated_by_bytes,
                    truncated_structurally: false,
                }
            } else {
                let (value, reduced) = reduce_structure(value, limits.structural_keep);
                let pretty = to_pretty(&value);
                tracing::debug!(
                    reduced,
                    formatted_len = pretty.len(),
                    ceiling = limits.structured_text_ceiling,
                    "formatted JSON exceeded the structured ceiling"
                );
                if pretty.len() <= limits.structured_text_ceiling {
                    ReducedBody::Structured {
                        value,
                        text: pretty,
                        truncated_by_bytes,
                        truncated_structurally: reduced,
                    }
                } else {
                    formatted_cut = true;
                    ReducedBody::PlainText {
                        text: truncate_on_char_boundary(pretty, limits.structured_text_ceiling),
                        truncated_by_bytes: true,
                        truncated_structurally: reduced,
                    }
                }
            }
        }
    };

    ReducedResult {
        body,
        original_size,
        applied_limit: max_response_bytes,
        structured_ceiling: limits.structured_text_ceiling,
        formatted_cut,
        decode_cut,
    }
}
