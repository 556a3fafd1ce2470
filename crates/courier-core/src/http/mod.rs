//! Blocking HTTP request pipeline
//!
//! This module provides:
//! - Immutable request descriptors built by chaining or from a config record
//! - Authorization, cookie and form/JSON body helpers
//! - Retry with fixed or exponential delay
//! - A pluggable transport, reqwest by default
//! - Response normalization with JSON, XML and text decoding

pub mod auth;
pub mod body;
pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod logger;
pub mod normalizer;
pub mod response;
pub mod retry;
pub mod transport;
pub mod xml;

pub use auth::Auth;
pub use body::Body;
pub use builder::{RedirectPolicy, RequestBuilder, RequestDescriptor};
pub use client::{Client, ClientConfig};
pub use config::{AuthConfig, BasicAuthConfig, RequestConfig};
pub use error::TransportError;
pub use executor::Executor;
pub use logger::{RequestLogger, TracingLogger};
pub use response::{HeaderValue, ParsedBody, Response, ResponseHeaders};
pub use retry::{Backoff, RetryPolicy};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportRequest};
