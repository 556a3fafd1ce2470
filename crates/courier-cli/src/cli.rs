//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use courier_core::{Method, ResponseFormat};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Courier CLI - configurable HTTP requests from the command line
///
/// Send one-off requests with retries, redirects and response decoding,
/// execute request records stored as JSON, YAML or TOML, and download files.
#[derive(Parser, Debug)]
#[command(
    name = "courier",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "COURIER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a single HTTP request
    Request(RequestArgs),

    /// Execute a request record file (JSON, YAML or TOML)
    Run(RunArgs),

    /// Download a URL to a file
    Download(DownloadArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the request command
#[derive(Parser, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS, ...)
    #[arg(value_name = "METHOD", value_parser = parse_method)]
    pub method: Method,

    /// Target URL
    #[arg(value_name = "URL")]
    pub url: String,

    /// Add a request header, `Name: Value` (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Raw request body; `@path` reads the body from a file
    #[arg(short, long, conflicts_with_all = ["json", "form"])]
    pub data: Option<String>,

    /// JSON request body, sent with `Content-Type: application/json`
    #[arg(long, conflicts_with = "form")]
    pub json: Option<String>,

    /// Form field `name=value`, sent form-url-encoded (repeatable)
    #[arg(long = "form", value_name = "FIELD")]
    pub form: Vec<String>,

    /// Cookie `name=value` (repeatable)
    #[arg(short = 'b', long = "cookie", value_name = "COOKIE")]
    pub cookies: Vec<String>,

    /// Basic authentication credentials, `user:password`
    #[arg(short, long, conflicts_with = "bearer")]
    pub user: Option<String>,

    /// Bearer token for the Authorization header
    #[arg(long, env = "COURIER_BEARER_TOKEN", hide_env_values = true)]
    pub bearer: Option<String>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Number of retries after a failed attempt
    #[arg(long)]
    pub retry: Option<u32>,

    /// Delay before each retry in milliseconds
    #[arg(long, value_name = "MS")]
    pub retry_delay: Option<u64>,

    /// Follow redirects
    #[arg(short = 'L', long)]
    pub location: bool,

    /// Maximum number of redirects to follow
    #[arg(long, requires = "location")]
    pub max_redirects: Option<u32>,

    /// Skip certificate and hostname verification
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Proxy URI
    #[arg(short = 'x', long)]
    pub proxy: Option<String>,

    /// How to decode the response body
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// User-Agent header value
    #[arg(short = 'A', long)]
    pub user_agent: Option<String>,

    /// Treat 4xx/5xx statuses as failures: retry them and exit non-zero
    #[arg(short, long)]
    pub fail: bool,

    /// Show response headers
    #[arg(short, long)]
    pub include: bool,

    /// Save the response body to a file
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the request record (`Method`, `URL`, `Header`, `Retry`, ...)
    #[arg(value_name = "REQUEST_FILE")]
    pub request_file: PathBuf,

    /// Treat 4xx/5xx statuses as failures: retry them and exit non-zero
    #[arg(short, long)]
    pub fail: bool,

    /// Show response headers
    #[arg(short, long)]
    pub include: bool,

    /// Save the response body to a file
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the download command
#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// URL to fetch
    #[arg(value_name = "URL")]
    pub url: String,

    /// Destination file
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Response body decoding
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Detect from Content-Type
    Auto,
    /// Decode as JSON
    Json,
    /// Decode as XML
    Xml,
    /// Keep as text
    Text,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<FormatArg> for ResponseFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Auto => ResponseFormat::Auto,
            FormatArg::Json => ResponseFormat::Json,
            FormatArg::Xml => ResponseFormat::Xml,
            FormatArg::Text => ResponseFormat::Text,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

fn parse_method(value: &str) -> std::result::Result<Method, String> {
    value.parse().map_err(|e: courier_core::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_request_parsing() {
        let cli = Cli::parse_from([
            "courier", "-v", "request", "post", "http://localhost/items",
            "-H", "Accept: application/json",
            "--json", r#"{"a":1}"#,
            "--retry", "2", "--retry-delay", "250",
            "-L", "--max-redirects", "3",
            "-k", "--format", "json",
        ]);

        assert_eq!(cli.verbosity_level(), 1);
        let Commands::Request(args) = cli.command else {
            panic!("expected request command");
        };
        assert_eq!(args.method, Method::Post);
        assert_eq!(args.headers, vec!["Accept: application/json"]);
        assert_eq!(args.json.as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(args.retry, Some(2));
        assert_eq!(args.retry_delay, Some(250));
        assert!(args.location);
        assert_eq!(args.max_redirects, Some(3));
        assert!(args.insecure);
        assert_eq!(args.format, Some(FormatArg::Json));
    }

    #[test]
    fn test_invalid_method_is_rejected() {
        let result = Cli::try_parse_from(["courier", "request", "FETCH", "http://h"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_body_flags_conflict() {
        let result = Cli::try_parse_from([
            "courier", "request", "POST", "http://h", "-d", "x", "--json", "{}",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["courier", "-vv", "download", "http://h/f", "out.bin"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["courier", "--quiet", "run", "request.yaml"]);
        assert_eq!(cli.verbosity_level(), 0);
        assert!(matches!(cli.command, Commands::Run(_)));
    }
}
