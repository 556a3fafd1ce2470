//! Transport seam between the executor and the network
//!
//! The executor hands a fully resolved [`TransportRequest`] to a
//! [`Transport`] once per attempt. [`ReqwestTransport`] is the default and
//! uses reqwest's blocking client, so it must not be called from inside an
//! async runtime.

use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::redirect;

use crate::http::builder::RedirectPolicy;
use crate::http::error::TransportError;
use crate::types::Method;

/// Everything the transport needs for one attempt
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    /// Final header list, including `Cookie` and `User-Agent`
    pub headers: Vec<(String, String)>,
    /// Present only for methods that carry a body and when non-empty
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
    pub redirects: RedirectPolicy,
    pub verify_ssl: bool,
    pub proxy: Option<String>,
}

/// Raw result of a successful transport call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// Status line first, then one `Name: Value` line per header
    pub header_lines: Vec<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Create a raw response from a status line, headers and a body
    pub fn new<I, S>(status_line: impl Into<String>, headers: I, body: impl Into<Vec<u8>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut header_lines = vec![status_line.into()];
        header_lines.extend(headers.into_iter().map(Into::into));
        Self {
            header_lines,
            body: body.into(),
        }
    }
}

/// One-shot request transport
pub trait Transport: Send + Sync {
    /// Perform a single attempt
    fn send(&self, request: &TransportRequest) -> Result<RawResponse, TransportError>;
}

/// Blocking transport backed by reqwest
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    connect_timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the time spent establishing a connection
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    fn build_client(&self, request: &TransportRequest) -> Result<Client, TransportError> {
        let redirect_policy = if request.redirects.follow {
            redirect::Policy::limited(request.redirects.max as usize)
        } else {
            redirect::Policy::none()
        };

        let mut builder = ClientBuilder::new()
            .redirect(redirect_policy)
            .danger_accept_invalid_certs(!request.verify_ssl)
            .danger_accept_invalid_hostnames(!request.verify_ssl);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        // Only an explicitly configured proxy is used, never the environment's
        match &request.proxy {
            Some(proxy) => {
                let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(|e| {
                    TransportError::Configure(format!("invalid proxy '{}': {}", proxy, e))
                })?;
                builder = builder.proxy(proxy);
            }
            None => builder = builder.no_proxy(),
        }

        builder
            .build()
            .map_err(|e| TransportError::Configure(e.to_string()))
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &TransportRequest) -> Result<RawResponse, TransportError> {
        let client = self.build_client(request)?;

        let mut outgoing = client.request(request.method.into(), request.url.as_str());
        for (name, value) in &request.headers {
            outgoing = outgoing.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            outgoing = outgoing.body(body.clone());
        }

        let response = outgoing.send()?;

        let mut header_lines = Vec::with_capacity(response.headers().len() + 1);
        header_lines.push(render_status_line(response.version(), response.status()));
        for (name, value) in response.headers() {
            header_lines.push(format!(
                "{}: {}",
                name,
                String::from_utf8_lossy(value.as_bytes())
            ));
        }

        let body = response.bytes()?.to_vec();

        Ok(RawResponse { header_lines, body })
    }
}

/// Render `HTTP/<version> <code> <reason>`
pub fn render_status_line(version: reqwest::Version, status: reqwest::StatusCode) -> String {
    let version = match version {
        reqwest::Version::HTTP_09 => "HTTP/0.9",
        reqwest::Version::HTTP_10 => "HTTP/1.0",
        reqwest::Version::HTTP_2 => "HTTP/2",
        reqwest::Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/1.1",
    };
    match status.canonical_reason() {
        Some(reason) => format!("{} {} {}", version, status.as_u16(), reason),
        None => format!("{} {}", version, status.as_u16()),
    }
}
