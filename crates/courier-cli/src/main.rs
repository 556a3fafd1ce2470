//! Courier CLI - configurable HTTP requests from the command line
//!
//! This is the main entry point for the Courier CLI application, providing
//! commands for sending one-off requests, executing stored request records,
//! and downloading files.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli, &config) {
        Ok(()) => process::exit(0),
        Err(e) => exit_with(&e),
    }
}

fn exit_with(e: &error::Error) -> ! {
    eprintln!(
        "{}",
        error::format_error(e, control::SHOULD_COLORIZE.should_colorize())
    );

    if e.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }

    process::exit(e.exit_code());
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let use_color = cli.use_color() && config.output.color;
    let mut output = OutputWriter::new(cli.output, use_color, cli.quiet);
    if !config.output.progress {
        output = output.without_progress();
    }

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Request(args) => handlers::handle_request(args, config, &mut output),
        Commands::Run(args) => handlers::handle_run(args, config, &mut output),
        Commands::Download(args) => handlers::handle_download(args, config, &mut output),
        Commands::Completions(args) => {
            handlers::handle_completions(args, &mut std::io::stdout())
        }
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);

    logging_config.merge_file_settings(&config.logging, verbosity);
    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
    }
    logging_config.ansi = cli.use_color();

    logging::init_logging(logging_config)
}
