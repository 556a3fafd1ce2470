//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), with specialized
//! rendering for HTTP responses and progress indicators for downloads.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use courier_core::{ParsedBody, Response};
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, trace};

/// Trait for formatting output with specialized support for responses
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a response, optionally including its headers
    fn format_response(&self, response: &Response, include_headers: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_response(&self, response: &Response, include_headers: bool) -> Result<String> {
        match self {
            OutputFormat::Human => format_response_human(response, include_headers, false),
            _ => self.format(response),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    #[allow(dead_code)]
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            // No progress bars with custom writers
            show_progress: false,
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Disable progress indicators regardless of the terminal
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let mut value_json = serde_json::to_value(value)?;
        redaction::redact_json_value(&mut value_json);
        trace!(
            "Outputting data: {}",
            serde_json::to_string(&value_json)
                .unwrap_or_else(|_| "[failed to serialize]".to_string())
        );

        let formatted = self.format.format(value)?;
        self.write_formatted(&formatted)
    }

    /// Write a response in the configured format
    pub fn response(&mut self, response: &Response, include_headers: bool) -> Result<()> {
        trace!(
            status = ?response.status,
            attempts = response.attempts,
            headers = %redacted_headers(response),
            "Outputting response"
        );

        let formatted = match self.format {
            OutputFormat::Human => {
                format_response_human(response, include_headers, self.use_color)?
            }
            format => format.format_response(response, include_headers)?,
        };
        self.write_formatted(&formatted)
    }

    fn write_formatted(&mut self, formatted: &str) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

fn redacted_headers(response: &Response) -> String {
    response
        .headers
        .iter()
        .flat_map(|(name, value)| {
            value
                .values()
                .into_iter()
                .map(move |v| format!("{}: {}", name, redaction::redact_header(name, v)))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Format a response for human reading
fn format_response_human(
    response: &Response,
    include_headers: bool,
    use_color: bool,
) -> Result<String> {
    let mut output = String::new();

    let attempts = match response.attempts {
        1 => "1 attempt".to_string(),
        n => format!("{} attempts", n),
    };

    if !response.success {
        let reason = response
            .error
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no response".to_string());
        let line = match response.status {
            Some(status) => format!("Status: {} ({}, {})", status, reason, attempts),
            None => format!("Request failed: {} ({})", reason, attempts),
        };
        output.push_str(&paint(&line, Tone::Bad, use_color));
        output.push('\n');
    } else {
        let status = response
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let format = response
            .format
            .map(|f| format!("{}, ", f))
            .unwrap_or_default();
        let line = format!("Status: {} ({}{})", status, format, attempts);
        output.push_str(&paint(&line, status_tone(response.status), use_color));
        output.push('\n');
    }

    if include_headers && !response.headers.is_empty() {
        for (name, value) in response.headers.iter() {
            for v in value.values() {
                if use_color {
                    output.push_str(&format!("{}: {}\n", name.bold(), v));
                } else {
                    output.push_str(&format!("{}: {}\n", name, v));
                }
            }
        }
    }

    let body = match &response.parsed {
        Some(ParsedBody::Json(value)) | Some(ParsedBody::Xml(value)) => {
            Some(serde_json::to_string_pretty(value)?)
        }
        Some(ParsedBody::Text(text)) => Some(text.clone()),
        None => response.body_text().map(|text| text.into_owned()),
    };

    if let Some(body) = body.filter(|b| !b.is_empty()) {
        output.push('\n');
        output.push_str(&body);
        if !body.ends_with('\n') {
            output.push('\n');
        }
    }

    Ok(output)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Good,
    Neutral,
    Bad,
}

fn status_tone(status: Option<u16>) -> Tone {
    match status {
        Some(200..=299) => Tone::Good,
        Some(400..=599) => Tone::Bad,
        _ => Tone::Neutral,
    }
}

fn paint(text: &str, tone: Tone, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    match tone {
        Tone::Good => text.green().to_string(),
        Tone::Neutral => text.yellow().to_string(),
        Tone::Bad => text.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}
