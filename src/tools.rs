//! The `request` and `download` tools.
//!
//! [`HttpTools`] wires the command builder, executor, reducer and encoder
//! together. It holds no mutable state, so one value can serve any number
//! of invocations.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use strum::VariantNames;

use crate::command::{build_download_args, build_request_args};
use crate::config::ToolConfig;
use crate::encoder::{self, DownloadReport, ToolResult};
use crate::error::RscurlError;
use crate::executor::{CapturedOutput, CommandExecutor, CommandSpec};
use crate::reducer::{self, DEFAULT_MAX_RESPONSE_BYTES, MAX_RESPONSE_BYTES_LIMIT, ReducedResult};
use crate::request::{
    DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DownloadArgs, DownloadSpec,
    HttpMethod, MAX_TIMEOUT_SECS, RequestArgs, RequestSpec,
};

/// Extra time the executor allows past `--max-time` before killing curl,
/// so curl's own timeout diagnostic normally wins.
pub const KILL_GRACE: Duration = Duration::from_secs(5);

/// curl's exit code for "operation timed out".
const CURL_TIMEOUT_EXIT: i32 = 28;

pub const REQUEST_TOOL: &str = "request";
pub const DOWNLOAD_TOOL: &str = "download";

/// Name, description and input schema of a registered tool.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Returns the definitions advertised by `tools/list`.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: REQUEST_TOOL,
            description: "Make an HTTP request with curl and return the response body. \
                JSON responses are pretty-printed; large responses are truncated.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "Absolute http(s) URL" },
                    "method": { "type": "string", "enum": HttpMethod::VARIANTS, "default": "GET" },
                    "headers": {
                        "type": "object",
                        "additionalProperties": { "type": "string" },
                        "description": "Request headers, sent in the given order"
                    },
                    "data": {
                        "type": "string",
                        "description": "Request body, sent for POST, PUT and PATCH only"
                    },
                    "timeoutSeconds": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": MAX_TIMEOUT_SECS,
                        "default": DEFAULT_REQUEST_TIMEOUT_SECS
                    },
                    "followRedirects": { "type": "boolean", "default": true },
                    "includeHeaders": { "type": "boolean", "default": false },
                    "userAgent": { "type": "string" },
                    "maxResponseBytes": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": MAX_RESPONSE_BYTES_LIMIT,
                        "default": DEFAULT_MAX_RESPONSE_BYTES
                    }
                },
                "required": ["url"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: DOWNLOAD_TOOL,
            description: "Download a URL to a file with curl.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "Absolute http(s) URL" },
                    "outputPath": { "type": "string", "description": "Destination file" },
                    "timeoutSeconds": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": MAX_TIMEOUT_SECS,
                        "default": DEFAULT_DOWNLOAD_TIMEOUT_SECS
                    },
                    "followRedirects": { "type": "boolean", "default": true }
                },
                "required": ["url", "outputPath"],
                "additionalProperties": false
            }),
        },
    ]
}

/// The tool implementations, bound to an executor and configuration.
pub struct HttpTools {
    executor: Arc<dyn CommandExecutor>,
    config: ToolConfig,
}

impl HttpTools {
    pub fn new(executor: Arc<dyn CommandExecutor>, config: ToolConfig) -> Self {
        Self { executor, config }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Builds the executor spec for one curl run.
    ///
    /// The executor deadline is `timeout_seconds` plus [`KILL_GRACE`],
    /// saturating rather than overflowing.
    fn curl_command(&self, args: Vec<String>, timeout_seconds: u64) -> CommandSpec {
        CommandSpec::new(&self.config.curl_path, args)
            .with_timeout(Duration::from_secs(timeout_seconds).saturating_add(KILL_GRACE))
            .with_capture_limit(self.config.capture_limit_bytes)
    }

    /// Runs curl for `args` with the given timeout and checks the outcome.
    fn run_curl(&self, args: Vec<String>, timeout_seconds: u64) -> Result<CapturedOutput, RscurlError> {
        let spec = self.curl_command(args, timeout_seconds);
        tracing::debug!("running: {}", spec.command_line());

        let captured = self.executor.execute(&spec)?;
        if captured.raw_bytes.is_empty() && captured.code() == Some(CURL_TIMEOUT_EXIT) {
            return Err(RscurlError::ProcessTimeout {
                command: self.config.curl_path.clone(),
                timeout_secs: timeout_seconds,
            });
        }
        if !captured.stderr.trim().is_empty() {
            tracing::debug!(stderr = %captured.stderr.trim(), "curl wrote diagnostics");
        }
        captured.require_output(&self.config.curl_path)
    }

    /// Performs an HTTP request and bounds its response.
    pub fn request(&self, spec: &RequestSpec) -> Result<ReducedResult, RscurlError> {
        let args = build_request_args(spec)?;
        tracing::info!(method = %spec.method, url = %spec.url, "request");

        let captured = self.run_curl(args, spec.timeout_seconds)?;
        Ok(reducer::reduce(
            &captured.raw_bytes,
            captured.byte_length,
            spec.max_response_bytes,
            &self.config.reducer_limits(),
        ))
    }

    /// Downloads a URL to disk and reports the size written.
    pub fn download(&self, spec: &DownloadSpec) -> Result<DownloadReport, RscurlError> {
        let args = build_download_args(spec);
        tracing::info!(url = %spec.url, output = %spec.output_path, "download");

        let captured = self
            .executor
            .execute(&self.curl_command(args, spec.timeout_seconds))?;
        if captured.code() == Some(CURL_TIMEOUT_EXIT) {
            return Err(RscurlError::ProcessTimeout {
                command: self.config.curl_path.clone(),
                timeout_secs: spec.timeout_seconds,
            });
        }
        // With --output, stdout stays empty; any failure is a failure.
        captured.require_output(&self.config.curl_path)?;

        let message = match std::fs::metadata(&spec.output_path) {
            Ok(metadata) => format!("Downloaded {} bytes to {}", metadata.len(), spec.output_path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("Download finished; nothing was written to {}", spec.output_path)
            }
            Err(e) => {
                return Err(RscurlError::io(
                    format!("failed to read metadata: {}", spec.output_path),
                    e,
                ));
            }
        };

        Ok(DownloadReport {
            success: true,
            output_path: spec.output_path.to_string(),
            message,
        })
    }

    /// Invokes the tool `name` with JSON `arguments`.
    ///
    /// Returns `None` for an unknown tool. Every failure of a known tool,
    /// including undecodable arguments, is an error-flagged result.
    pub fn call(&self, name: &str, arguments: Value) -> Option<ToolResult> {
        let result = match name {
            REQUEST_TOOL => self.call_request(arguments),
            DOWNLOAD_TOOL => self.call_download(arguments),
            _ => return None,
        };
        Some(result.unwrap_or_else(|err| {
            tracing::warn!(tool = name, "tool call failed: {}", err);
            encoder::encode_error(&err)
        }))
    }

    fn call_request(&self, arguments: Value) -> Result<ToolResult, RscurlError> {
        let args: RequestArgs = decode_arguments(arguments)?;
        let spec = args.into_spec(&self.config.user_agent)?;
        let reduced = self.request(&spec)?;
        Ok(encoder::encode_response(&reduced))
    }

    fn call_download(&self, arguments: Value) -> Result<ToolResult, RscurlError> {
        let args: DownloadArgs = decode_arguments(arguments)?;
        let spec = args.into_spec()?;
        let report = self.download(&spec)?;
        Ok(encoder::encode_download(&report))
    }
}

fn decode_arguments<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T, RscurlError> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments)
        .map_err(|e| RscurlError::Validation(format!("invalid arguments: {}", e)))
}
