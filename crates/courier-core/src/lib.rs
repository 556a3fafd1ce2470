//! Courier Core - configurable blocking HTTP client
//!
//! Requests are described with a chainable [`RequestBuilder`] or a typed
//! [`RequestConfig`] record, then dispatched through a [`Client`]. Every
//! dispatch returns a normalized [`Response`]: transport failures are
//! retried according to the request's retry policy and reported on the
//! record rather than as an `Err`.
//!
//! # Main Components
//!
//! - **Request Builder**: headers, body helpers, auth, cookies, timeouts,
//!   redirects, proxy, retry policy and expected response format
//! - **Executor**: retry loop, header finalization, status and header
//!   normalization, JSON/XML/text body decoding
//! - **Transport**: one attempt on the wire, reqwest's blocking client by default
//!
//! # Example
//!
//! ```no_run
//! use courier_core::{Client, Method};
//! use std::time::Duration;
//!
//! let client = Client::new();
//! let request = client
//!     .build_request(Method::Get, "https://httpbin.org/get")
//!     .header("Accept", "application/json")
//!     .retry(2, Duration::from_millis(500))
//!     .build();
//!
//! let response = client.dispatch(request);
//! if response.success {
//!     println!("status {:?}", response.status);
//! }
//! ```

pub mod error;
pub mod http;
pub mod types;

pub use error::{Error, Result};
pub use http::{
    Auth, Body, Client, ClientConfig, HeaderValue, ParsedBody, RawResponse, RequestBuilder,
    RequestConfig, RequestDescriptor, RequestLogger, Response, ResponseHeaders, RetryPolicy,
    Transport, TransportError, TransportRequest,
};
pub use types::{Method, ResponseFormat, StatusPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_user_agent_carries_version() {
        let request = RequestBuilder::new(Method::Get, "http://h").build();
        assert_eq!(request.user_agent(), format!("courier/{}", VERSION));
    }
}
