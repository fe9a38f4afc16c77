pub mod cli;
pub mod command;
pub mod config;
pub mod encoder;
pub mod error;
pub mod executor;
pub mod reducer;
pub mod request;
pub(crate) mod serde_helpers;
pub mod tools;

pub use error::RscurlError;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use camino::Utf8Path;
use tracing_subscriber::{FmtSubscriber, filter::LevelFilter};

use crate::config::ToolConfig;
use crate::executor::CommandExecutor;
use crate::request::{DownloadArgs, RequestArgs};
use crate::tools::HttpTools;

pub fn init_logging(log_level: cli::LogLevel) -> Result<()> {
    let filter = match log_level {
        cli::LogLevel::Trace => LevelFilter::TRACE,
        cli::LogLevel::Debug => LevelFilter::DEBUG,
        cli::LogLevel::Info => LevelFilter::INFO,
        cli::LogLevel::Warn => LevelFilter::WARN,
        cli::LogLevel::Error => LevelFilter::ERROR,
    };

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(filter)
            .with_writer(io::stderr)
            .finish(),
    )
    .context("failed to set global default tracing subscriber")
}

fn load_config(path: Option<&Utf8Path>) -> Result<ToolConfig> {
    match path {
        Some(path) => config::load_config(path)
            .with_context(|| format!("failed to load configuration from {}", path)),
        None => Ok(ToolConfig::default()),
    }
}

/// Splits a `Name: value` header argument.
fn parse_header_arg(raw: &str) -> Result<(String, String), RscurlError> {
    let (name, value) = raw.split_once(':').ok_or_else(|| {
        RscurlError::Validation(format!("header '{}' is not in 'Name: value' form", raw))
    })?;
    Ok((name.trim().to_string(), value.trim_start().to_string()))
}

/// Performs one request and writes the encoded result to `out`.
pub fn run_request<W: Write>(
    opts: &cli::RequestCliArgs,
    executor: Arc<dyn CommandExecutor>,
    mut out: W,
) -> Result<()> {
    let config = load_config(opts.config.as_deref())?;
    let headers = opts
        .headers
        .iter()
        .map(String::as_str)
        .map(parse_header_arg)
        .collect::<Result<Vec<_>, _>>()?;
    let args = RequestArgs {
        url: opts.url.clone(),
        method: Some(opts.method.clone()),
        headers,
        data: opts.data.clone(),
        timeout_seconds: Some(opts.timeout),
        follow_redirects: Some(!opts.no_follow),
        include_headers: Some(opts.include),
        user_agent: opts.user_agent.clone(),
        max_response_bytes: Some(opts.max_response_bytes),
    };

    let tools = HttpTools::new(executor, config);
    let spec = args.into_spec(&tools.config().user_agent)?;
    let reduced = tools.request(&spec)?;
    let result = encoder::encode_response(&reduced);
    writeln!(out, "{}", result.joined_text()).context("failed to write response")?;
    Ok(())
}

/// Performs one download and writes the report to `out`.
pub fn run_download<W: Write>(
    opts: &cli::DownloadCliArgs,
    executor: Arc<dyn CommandExecutor>,
    mut out: W,
) -> Result<()> {
    let config = load_config(opts.config.as_deref())?;
    let args = DownloadArgs {
        url: opts.url.clone(),
        output_path: opts.output.clone(),
        timeout_seconds: Some(opts.timeout),
        follow_redirects: Some(!opts.no_follow),
    };

    let tools = HttpTools::new(executor, config);
    let spec = args.into_spec()?;
    let report = tools.download(&spec)?;
    writeln!(out, "{}", report.message).context("failed to write report")?;
    Ok(())
}
