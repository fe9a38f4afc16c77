use anyhow::Result;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Make a single HTTP request and print the bounded response
    Request(RequestCliArgs),

    /// Download a URL to a file
    Download(DownloadCliArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct RequestCliArgs {
    /// Absolute http(s) URL
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request header as 'Name: value' (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Request body (POST, PUT and PATCH only)
    #[arg(short, long)]
    pub data: Option<String>,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = crate::request::DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Do not follow redirects
    #[arg(long)]
    pub no_follow: bool,

    /// Include response headers in the output
    #[arg(short, long)]
    pub include: bool,

    /// User agent to send
    #[arg(short = 'A', long)]
    pub user_agent: Option<String>,

    /// Response byte budget
    #[arg(long, default_value_t = crate::reducer::DEFAULT_MAX_RESPONSE_BYTES as u64)]
    pub max_response_bytes: u64,

    /// Path to an optional YAML configuration file
    #[arg(short, long)]
    pub config: Option<Utf8PathBuf>,

    /// Set the log level
    #[arg(short, long, default_value = "warn")]
    pub log_level: LogLevel,

    /// Do not run, just log the command that would be run
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct DownloadCliArgs {
    /// Absolute http(s) URL
    pub url: String,

    /// Destination file
    #[arg(short, long)]
    pub output: Utf8PathBuf,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = crate::request::DEFAULT_DOWNLOAD_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Do not follow redirects
    #[arg(long)]
    pub no_follow: bool,

    /// Path to an optional YAML configuration file
    #[arg(short, long)]
    pub config: Option<Utf8PathBuf>,

    /// Set the log level
    #[arg(short, long, default_value = "warn")]
    pub log_level: LogLevel,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

/// Log levels for controlling the verbosity of logging output.
///
/// Maps directly to the levels of the `tracing` crate. Logs always go to
/// stderr; stdout carries command output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

pub fn parse_args() -> Result<Cli> {
    Ok(Cli::parse())
}
