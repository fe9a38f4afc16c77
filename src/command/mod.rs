//! Translation of validated request specs into `curl` argument vectors.
//!
//! The builders are pure functions: they return a `Vec<String>` that is
//! handed to the process executor as-is, never joined and re-split by a
//! shell. [`render_command_line`] produces a shell-quoted rendering of the
//! same vector for logs and dry runs.

mod args;

pub use args::CommandArgsBuilder;

use crate::error::RscurlError;
use crate::request::{DownloadSpec, HttpMethod, RequestSpec};

/// Builds the `curl` arguments for a `request` invocation.
///
/// The body is attached with `--data-raw` so a leading `@` is sent
/// literally, and only for methods that carry a body. `HEAD` uses `--head`
/// because `--request HEAD` makes curl wait for a body that never arrives.
pub fn build_request_args(spec: &RequestSpec) -> Result<Vec<String>, RscurlError> {
    spec.validate()?;

    let mut builder = CommandArgsBuilder::new();
    builder.push_flag("--silent");
    builder.push_flag("--show-error");
    if spec.method == HttpMethod::Head {
        builder.push_flag("--head");
    } else {
        builder.push_flag_value("--request", spec.method.to_string());
    }
    builder.push_flag_value("--max-time", spec.timeout_seconds.to_string());
    builder.push_flag_if("--location", spec.follow_redirects);
    builder.push_flag_if("--include", spec.include_headers);
    builder.push_flag_nonempty("--user-agent", &spec.user_agent);
    for (name, value) in &spec.headers {
        builder.push_flag_value("--header", format!("{}: {}", name, value));
    }
    if let Some(body) = &spec.body {
        if spec.method.allows_body() {
            builder.push_flag_value("--data-raw", body.as_str());
        } else {
            tracing::debug!(method = %spec.method, "ignoring body for method without one");
        }
    }
    builder.push_flag_value("--url", spec.url.as_str());

    Ok(builder.into_args())
}

/// Builds the `curl` arguments for a `download` invocation.
pub fn build_download_args(spec: &DownloadSpec) -> Vec<String> {
    let mut builder = CommandArgsBuilder::new();
    builder.push_flag("--silent");
    builder.push_flag("--show-error");
    builder.push_flag("--fail");
    builder.push_flag_value("--max-time", spec.timeout_seconds.to_string());
    builder.push_flag_if("--location", spec.follow_redirects);
    builder.push_flag_value("--output", spec.output_path.as_str());
    builder.push_flag_value("--url", spec.url.as_str());
    builder.into_args()
}

/// Characters that never need quoting in a POSIX shell word.
fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | '@' | '%' | '+' | ',')
}

/// Quotes `value` as a single POSIX shell word.
///
/// Embedded single quotes become `'\''`: close the quote, emit an escaped
/// quote, reopen.
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_shell_safe) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Renders `command` and `args` as a copy-pasteable shell command line.
pub fn render_command_line(command: &str, args: &[String]) -> String {
    std::iter::once(command)
        .chain(args.iter().map(String::as_str))
        .map(shell_quote)
        .collect::<Vec<_>>()
        .join(" ")
}
