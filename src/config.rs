//! Tool configuration.
//!
//! The configuration file is optional YAML; every field has a default, so an
//! empty file and no file at all behave the same.

use std::fs::File;
use std::io::BufReader;

use camino::Utf8Path;
use serde::Deserialize;

use crate::error::RscurlError;
use crate::executor::CAPTURE_LIMIT_BYTES;
use crate::reducer::{MAX_RESPONSE_BYTES_LIMIT, ReducerLimits, STRUCTURAL_KEEP, STRUCTURED_TEXT_CEILING};

fn default_curl_path() -> String {
    "curl".to_string()
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_structured_text_ceiling() -> usize {
    STRUCTURED_TEXT_CEILING
}

fn default_capture_limit_bytes() -> usize {
    CAPTURE_LIMIT_BYTES
}

/// Settings shared by every tool invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// The client executable, looked up in PATH unless absolute.
    #[serde(default = "default_curl_path")]
    pub curl_path: String,
    /// User agent sent when a request does not set one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Formatted JSON longer than this is structurally truncated.
    #[serde(default = "default_structured_text_ceiling")]
    pub structured_text_ceiling: usize,
    /// Stdout bytes kept from one curl run; the rest is drained and counted.
    #[serde(default = "default_capture_limit_bytes")]
    pub capture_limit_bytes: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            curl_path: default_curl_path(),
            user_agent: default_user_agent(),
            structured_text_ceiling: default_structured_text_ceiling(),
            capture_limit_bytes: default_capture_limit_bytes(),
        }
    }
}

impl ToolConfig {
    /// Validates the configuration.
    ///
    /// The structured ceiling may not be lower than the largest byte budget a
    /// caller can request, so a plain-text response is never cut twice. The
    /// capture limit must exceed that budget so truncation is always measured
    /// against real output.
    pub fn validate(&self) -> Result<(), RscurlError> {
        if self.curl_path.trim().is_empty() {
            return Err(RscurlError::Config("curl_path must not be empty".to_string()));
        }
        if self.user_agent.contains(['\r', '\n', '\0']) {
            return Err(RscurlError::Config(
                "user_agent must not contain CR, LF or NUL characters".to_string(),
            ));
        }
        if self.structured_text_ceiling < MAX_RESPONSE_BYTES_LIMIT {
            return Err(RscurlError::Config(format!(
                "structured_text_ceiling must be at least {}, got {}",
                MAX_RESPONSE_BYTES_LIMIT, self.structured_text_ceiling
            )));
        }
        if self.capture_limit_bytes <= MAX_RESPONSE_BYTES_LIMIT
            || self.capture_limit_bytes > CAPTURE_LIMIT_BYTES
        {
            return Err(RscurlError::Config(format!(
                "capture_limit_bytes must be greater than {} and at most {}, got {}",
                MAX_RESPONSE_BYTES_LIMIT, CAPTURE_LIMIT_BYTES, self.capture_limit_bytes
            )));
        }
        Ok(())
    }

    /// Reducer limits derived from this configuration.
    pub fn reducer_limits(&self) -> ReducerLimits {
        ReducerLimits {
            structured_text_ceiling: self.structured_text_ceiling,
            structural_keep: STRUCTURAL_KEEP,
        }
    }
}

/// Loads and validates a configuration file.
pub fn load_config(path: &Utf8Path) -> Result<ToolConfig, RscurlError> {
    let file = File::open(path).map_err(|e| RscurlError::io(path.as_str(), e))?;
    let reader = BufReader::new(file);
    // An empty document deserializes as unit, not as a map.
    let config: Option<ToolConfig> = serde_yaml::from_reader(reader)
        .map_err(|e| RscurlError::Config(format!("failed to parse yaml: {}: {}", path, e)))?;
    let config = config.unwrap_or_default();
    config.validate()?;
    tracing::debug!(?config, "loaded configuration from {}", path);
    Ok(config)
}
