//! Request descriptions accepted by the `request` and `download` tools.
//!
//! Tool arguments arrive as loosely typed JSON ([`RequestArgs`],
//! [`DownloadArgs`]) and are validated into [`RequestSpec`] and
//! [`DownloadSpec`]. Only validated specs reach the command builder, so an
//! unparsable URL or an unknown method never gets as far as spawning a
//! process.

use std::str::FromStr;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::Deserialize;
use strum::{Display, EnumString, VariantNames};
use url::Url;

use crate::error::RscurlError;
use crate::reducer::{DEFAULT_MAX_RESPONSE_BYTES, MAX_RESPONSE_BYTES_LIMIT};

/// Default timeout for `request`, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default timeout for `download`, in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Upper bound on `timeoutSeconds` for either tool (one day).
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

/// RFC 9110 `token` characters.
static HEADER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[!#$%&'*+\-.^_`|~0-9A-Za-z]+$").expect("header name pattern is valid")
});

/// HTTP methods the `request` tool accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Returns true for the methods that carry a request body.
    pub fn allows_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// Parses a method name, rejecting anything outside the supported set.
    pub fn parse(method: &str) -> Result<Self, RscurlError> {
        Self::from_str(method).map_err(|_| RscurlError::InvalidMethod(method.to_string()))
    }
}

/// Parses and validates a request URL.
///
/// The URL must be absolute and use the `http` or `https` scheme.
pub fn parse_url(raw: &str) -> Result<Url, RscurlError> {
    let url = Url::parse(raw).map_err(|e| RscurlError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RscurlError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Rejects characters that would let a value break out of its header line.
fn validate_header_text(label: &str, value: &str) -> Result<(), RscurlError> {
    if value.contains(['\r', '\n', '\0']) {
        return Err(RscurlError::Validation(format!(
            "{} must not contain CR, LF or NUL characters",
            label
        )));
    }
    Ok(())
}

/// Validates a single header name/value pair.
pub(crate) fn validate_header(name: &str, value: &str) -> Result<(), RscurlError> {
    if !HEADER_NAME.is_match(name) {
        return Err(RscurlError::Validation(format!("invalid header name '{}'", name)));
    }
    validate_header_text(&format!("header '{}'", name), value)
}

fn validate_timeout(timeout_seconds: u64) -> Result<u64, RscurlError> {
    if timeout_seconds == 0 || timeout_seconds > MAX_TIMEOUT_SECS {
        return Err(RscurlError::Validation(format!(
            "timeoutSeconds must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, timeout_seconds
        )));
    }
    Ok(timeout_seconds)
}

/// A validated description of an outgoing HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub url: Url,
    pub method: HttpMethod,
    /// Headers in caller order.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
    pub include_headers: bool,
    /// Empty means the client's own default.
    pub user_agent: String,
    pub max_response_bytes: usize,
}

impl RequestSpec {
    /// Creates a GET request for `url` with default settings.
    pub fn new(url: &str) -> Result<Self, RscurlError> {
        Ok(Self {
            url: parse_url(url)?,
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
            follow_redirects: true,
            include_headers: false,
            user_agent: String::new(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        })
    }

    /// Sets the method
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Appends a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the response byte budget
    #[must_use]
    pub fn with_max_response_bytes(mut self, max_response_bytes: usize) -> Self {
        self.max_response_bytes = max_response_bytes;
        self
    }

    /// Checks every field constraint.
    ///
    /// Called by the command builder so a hand-built spec is held to the
    /// same rules as one decoded from tool arguments.
    pub fn validate(&self) -> Result<(), RscurlError> {
        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(RscurlError::InvalidUrl {
                url: self.url.to_string(),
                reason: format!("unsupported scheme '{}'", self.url.scheme()),
            });
        }
        for (name, value) in &self.headers {
            validate_header(name, value)?;
        }
        if let Some(body) = &self.body
            && body.contains('\0')
        {
            return Err(RscurlError::Validation(
                "request body must not contain NUL characters".to_string(),
            ));
        }
        validate_header_text("userAgent", &self.user_agent)?;
        validate_timeout(self.timeout_seconds)?;
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(RscurlError::Validation(format!(
                "maxResponseBytes must be between 1 and {}, got {}",
                MAX_RESPONSE_BYTES_LIMIT, self.max_response_bytes
            )));
        }
        Ok(())
    }
}

/// Raw arguments of the `request` tool.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RequestArgs {
    pub url: String,
    pub method: Option<String>,
    #[serde(deserialize_with = "crate::serde_helpers::deserialize_ordered_headers")]
    pub headers: Vec<(String, String)>,
    pub data: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub follow_redirects: Option<bool>,
    pub include_headers: Option<bool>,
    pub user_agent: Option<String>,
    pub max_response_bytes: Option<u64>,
}

impl RequestArgs {
    /// Validates the arguments into a [`RequestSpec`].
    ///
    /// `default_user_agent` applies when the caller did not supply one.
    pub fn into_spec(self, default_user_agent: &str) -> Result<RequestSpec, RscurlError> {
        let url = parse_url(&self.url)?;
        let method = match self.method.as_deref() {
            Some(method) => HttpMethod::parse(method)?,
            None => HttpMethod::Get,
        };
        let max_response_bytes = self
            .max_response_bytes
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
            .unwrap_or(DEFAULT_MAX_RESPONSE_BYTES);

        let spec = RequestSpec {
            url,
            method,
            headers: self.headers,
            body: self.data,
            timeout_seconds: self.timeout_seconds.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            follow_redirects: self.follow_redirects.unwrap_or(true),
            include_headers: self.include_headers.unwrap_or(false),
            user_agent: self.user_agent.unwrap_or_else(|| default_user_agent.to_string()),
            max_response_bytes,
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// A validated description of a download to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSpec {
    pub url: Url,
    pub output_path: Utf8PathBuf,
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
}

/// Raw arguments of the `download` tool.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DownloadArgs {
    pub url: String,
    pub output_path: Utf8PathBuf,
    pub timeout_seconds: Option<u64>,
    pub follow_redirects: Option<bool>,
}

impl DownloadArgs {
    /// Validates the arguments into a [`DownloadSpec`].
    pub fn into_spec(self) -> Result<DownloadSpec, RscurlError> {
        let url = parse_url(&self.url)?;
        validate_output_path(&self.output_path)?;
        Ok(DownloadSpec {
            url,
            output_path: self.output_path,
            timeout_seconds: validate_timeout(
                self.timeout_seconds.unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            )?,
            follow_redirects: self.follow_redirects.unwrap_or(true),
        })
    }
}

/// Validates that `path` names a file whose parent directory exists.
///
/// `-` is refused because curl reads `--output -` as stdout.
fn validate_output_path(path: &Utf8Path) -> Result<(), RscurlError> {
    if path.as_str().is_empty() {
        return Err(RscurlError::Validation("outputPath must not be empty".to_string()));
    }
    if path.as_str() == "-" {
        return Err(RscurlError::Validation(
            "outputPath '-' would write to stdout; name a file".to_string(),
        ));
    }
    if path.is_dir() {
        return Err(RscurlError::Validation(format!("outputPath is a directory: {}", path)));
    }
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() && !parent.is_dir() => {
            Err(RscurlError::Validation(format!(
                "parent directory of outputPath does not exist: {}",
                parent
            )))
        }
        _ => Ok(()),
    }
}
