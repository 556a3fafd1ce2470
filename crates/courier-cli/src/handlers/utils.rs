//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use courier_core::http::TracingLogger;
use courier_core::{Client, Response, StatusPolicy, TransportError};
use std::path::Path;

/// Client seeded with the configured defaults, logging through tracing
pub fn build_client(config: &Config, fail_on_status: bool) -> Client {
    let policy = if fail_on_status {
        StatusPolicy::ErrorStatusFails
    } else {
        StatusPolicy::TransportOnly
    };
    Client::new()
        .with_config(config.client_config(policy))
        .with_logger(TracingLogger)
}

/// How a finished response is presented
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions<'a> {
    pub include_headers: bool,
    pub save_to: Option<&'a Path>,
}

/// Print a response, optionally save its body, and turn failures into errors
pub fn report_response(
    response: &Response,
    options: ReportOptions<'_>,
    output: &mut OutputWriter,
) -> Result<()> {
    match options.save_to {
        Some(path) => {
            if let Some(body) = &response.raw_body {
                std::fs::write(path, body)?;
                output.info(&format!(
                    "Saved {} bytes to {}",
                    body.len(),
                    path.display()
                ))?;
            }
            let mut summary = response.clone();
            summary.raw_body = None;
            summary.parsed = None;
            output.response(&summary, options.include_headers)?;
        }
        None => output.response(response, options.include_headers)?,
    }

    if let Some(status) = response.status.filter(|s| response.success && *s >= 400) {
        output.warning(&format!(
            "Server answered with status {}; pass --fail to exit non-zero",
            status
        ))?;
    }

    response_outcome(response)
}

/// Map an unsuccessful response onto the CLI error it exits with
pub fn response_outcome(response: &Response) -> Result<()> {
    if response.success {
        return Ok(());
    }

    match &response.error {
        Some(TransportError::Status(status)) => Err(Error::HttpStatus { status: *status }),
        Some(error) => Err(Error::Transport {
            attempts: response.attempts,
            source: error.clone(),
        }),
        None => Err(Error::Transport {
            attempts: response.attempts,
            source: TransportError::NoResponse,
        }),
    }
}

/// Split `Name: Value` into its parts
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::invalid_args(format!("header '{}' must be 'Name: Value'", raw)))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_args(format!("header '{}' has an empty name", raw)));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Split `name=value` into its parts
pub fn parse_pair(raw: &str, what: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| Error::invalid_args(format!("{} '{}' must be 'name=value'", what, raw)))?;
    if name.is_empty() {
        return Err(Error::invalid_args(format!("{} '{}' has an empty name", what, raw)));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Read an argument value, treating `@path` as a file reference
pub fn read_argument(raw: &str) -> Result<Vec<u8>> {
    match raw.strip_prefix('@') {
        Some(path) => {
            let path = Path::new(path);
            if !path.exists() {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            Ok(std::fs::read(path)?)
        }
        None => Ok(raw.as_bytes().to_vec()),
    }
}
