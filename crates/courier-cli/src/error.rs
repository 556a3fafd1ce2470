//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use courier_core::TransportError;
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from courier-core library
    #[error("Core error: {0}")]
    Core(#[from] courier_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {} format", path.display(), expected)]
    InvalidFormat {
        path: PathBuf,
        expected: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument value or combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// The request never produced a response
    #[error("Request failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// The server answered with an error status under `--fail`
    #[error("Server responded with status {status}")]
    HttpStatus { status: u16 },

    /// Download could not be completed
    #[error("Download of {url} to {} failed", path.display())]
    Download { url: String, path: PathBuf },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::Config(_) => 5,
            Self::InvalidArgs(_) => 6,
            Self::Transport { source, .. } => match source {
                TransportError::Timeout(_) => 11,
                _ => 10,
            },
            Self::HttpStatus { .. } => 22,
            Self::Download { .. } => 23,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut message = error.to_string();

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(&format!("\n  caused by: {}", text));
        }
        source = cause.source();
    }

    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), message)
    } else {
        format!("Error: {}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::config("x").exit_code(), 5);
        assert_eq!(Error::invalid_args("x").exit_code(), 6);
        assert_eq!(Error::HttpStatus { status: 404 }.exit_code(), 22);
        assert_eq!(
            Error::Transport {
                attempts: 3,
                source: TransportError::Timeout("30s".into()),
            }
            .exit_code(),
            11
        );
        assert_eq!(
            Error::Transport {
                attempts: 1,
                source: TransportError::NoResponse,
            }
            .exit_code(),
            10
        );
    }

    #[test]
    fn test_help_only_for_argument_errors() {
        assert!(Error::invalid_args("bad header").should_show_help());
        assert!(!Error::other("boom").should_show_help());
    }

    #[test]
    fn test_format_error_plain() {
        let err = Error::Transport {
            attempts: 2,
            source: TransportError::Connect("refused".into()),
        };
        assert_eq!(
            format_error(&err, false),
            "Error: Request failed after 2 attempt(s): Connection failed: refused"
        );
    }

    #[test]
    fn test_format_error_includes_causes() {
        let err = Error::InvalidFormat {
            path: PathBuf::from("request.toml"),
            expected: "TOML".to_string(),
            source: Some(anyhow::anyhow!("expected `=`")),
        };
        let formatted = format_error(&err, false);
        assert!(formatted.starts_with("Error: Invalid file format for request.toml"));
        assert!(formatted.contains("caused by: expected `=`"));
    }
}
