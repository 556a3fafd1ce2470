//! Transport failure classification
//!
//! Every way an attempt can fail is folded into [`TransportError`]. The
//! executor retries all of them uniformly and surfaces the last one on the
//! response record.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single transport attempt
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TransportError {
    /// The transport could not be set up (bad proxy URI, TLS backend, invalid header)
    #[error("Failed to configure transport: {0}")]
    Configure(String),

    /// Connection, DNS or TLS handshake failure
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The per-attempt timeout elapsed
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other failure while sending or reading the response
    #[error("Request failed: {0}")]
    Request(String),

    /// The transport returned without producing a response
    #[error("No response received")]
    NoResponse,

    /// A 4xx/5xx status rejected under `StatusPolicy::ErrorStatusFails`
    #[error("Server responded with error status {0}")]
    Status(u16),
}

impl TransportError {
    /// Classify a reqwest error
    pub fn from_request_error(error: reqwest::Error) -> Self {
        let message = error_chain(&error);
        if error.is_timeout() {
            TransportError::Timeout(message)
        } else if error.is_connect() {
            TransportError::Connect(message)
        } else if error.is_builder() {
            TransportError::Configure(message)
        } else {
            TransportError::Request(message)
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::from_request_error(error)
    }
}

/// Render an error with its sources, `outer: inner: root`
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            TransportError::Connect("refused".to_string()).to_string(),
            "Connection failed: refused"
        );
        assert_eq!(TransportError::NoResponse.to_string(), "No response received");
        assert_eq!(
            TransportError::Status(503).to_string(),
            "Server responded with error status 503"
        );
    }

    #[test]
    fn test_serialization_is_tagged() {
        let json = serde_json::to_value(TransportError::Timeout("30s".to_string())).unwrap();
        assert_eq!(json["kind"], "timeout");
        assert_eq!(json["detail"], "30s");

        let json = serde_json::to_value(TransportError::NoResponse).unwrap();
        assert_eq!(json["kind"], "no_response");
    }

    #[test]
    fn test_error_chain_includes_sources() {
        #[derive(Debug, Error)]
        #[error("outer")]
        struct Outer(#[source] std::io::Error);

        let wrapped = Outer(std::io::Error::new(std::io::ErrorKind::Other, "inner"));
        assert_eq!(error_chain(&wrapped), "outer: inner");
    }
}
