//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod download;
mod request;
mod run;
mod utils;

pub use completions::handle_completions;
pub use download::handle_download;
pub use request::handle_request;
pub use run::handle_run;
