//! Error types for the Courier core library
//!
//! These errors cover request *construction* only: serializing a JSON body,
//! parsing a configuration record, or naming an unknown HTTP method.
//! Dispatching a request never returns an error; transport failures are
//! folded into the [`Response`](crate::http::Response) record instead.

use thiserror::Error;

/// Main error type for Courier operations
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization and parsing errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration record errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// An HTTP method outside the supported set
    #[error("Unsupported HTTP method: {method}")]
    InvalidMethod { method: String },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            message: source.to_string(),
            source,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            message: source.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_method_display() {
        let err = Error::InvalidMethod {
            method: "FETCH".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported HTTP method: FETCH");
    }

    #[test]
    fn test_json_conversion_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = Error::from(source);
        assert!(err.to_string().starts_with("JSON error:"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_configuration_helper() {
        let err = Error::configuration("missing URL");
        assert!(matches!(err, Error::Configuration { source: None, .. }));
        assert!(err.to_string().contains("missing URL"));
    }
}
