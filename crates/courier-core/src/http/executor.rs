//! Request execution pipeline
//!
//! [`Executor::execute`] turns a [`RequestDescriptor`] into a [`Response`]:
//! finalize headers, run the transport under the retry policy, then
//! normalize status, headers, cookies and body. It never fails; transport
//! errors end up on the returned record.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use log::Level;

use crate::http::builder::RequestDescriptor;
use crate::http::error::TransportError;
use crate::http::logger::RequestLogger;
use crate::http::normalizer::{
    decode_body, normalize_headers, parse_status, resolve_format, NormalizedHeaders,
};
use crate::http::response::Response;
use crate::http::retry::execute_with_retry;
use crate::http::transport::{RawResponse, Transport, TransportRequest};

/// Name of the cookie request header
pub const COOKIE: &str = "Cookie";
/// Name of the user agent request header
pub const USER_AGENT: &str = "User-Agent";

/// Runs requests against a transport
#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
    logger: Option<Arc<dyn RequestLogger>>,
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

/// A failed attempt, keeping the response when one was received
struct AttemptFailure {
    error: TransportError,
    response: Option<RawResponse>,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl From<TransportError> for AttemptFailure {
    fn from(error: TransportError) -> Self {
        Self {
            error,
            response: None,
        }
    }
}

impl Executor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            logger: None,
        }
    }

    /// Report request start and completion to `logger`
    pub fn with_logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Execute a request, retries included
    pub fn execute(&self, request: &RequestDescriptor) -> Response {
        let summary = format!("{} {}", request.method(), request.url());
        self.log(&summary, Level::Info);

        let transport_request = prepare_transport_request(request);
        let started = Instant::now();

        let outcome = execute_with_retry(request.retry(), |attempt| {
            tracing::debug!(
                attempt,
                method = %request.method(),
                url = %request.url(),
                "Sending request"
            );
            let raw = self.transport.send(&transport_request)?;
            match parse_status(&raw.header_lines) {
                Some(code) if request.status_policy().rejects(Some(code)) => Err(AttemptFailure {
                    error: TransportError::Status(code),
                    response: Some(raw),
                }),
                _ => Ok(raw),
            }
        });

        let attempts = outcome.attempts;
        let response = match outcome.result {
            Ok(raw) => normalize(request, raw, attempts),
            Err(AttemptFailure {
                error,
                response: Some(raw),
            }) => {
                let mut response = normalize(request, raw, attempts);
                response.success = false;
                response.parsed = None;
                response.error = Some(error);
                response
            }
            Err(AttemptFailure {
                error,
                response: None,
            }) => Response::failure(error, attempts),
        };

        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            attempts,
            status = ?response.status,
            success = response.success,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );

        let status = response
            .status
            .map(|code| code.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        self.log(&format!("{} completed with status {}", summary, status), Level::Info);

        response
    }

    fn log(&self, message: &str, level: Level) {
        if let Some(logger) = &self.logger {
            logger.log(message, level);
        }
    }
}

/// Final header list: request headers, then `Cookie` when cookies are set,
/// then `User-Agent` unless one is already present in any casing
pub fn finalize_headers(request: &RequestDescriptor) -> Vec<(String, String)> {
    let mut headers = request.headers().to_vec();

    if !request.cookies().is_empty() {
        let cookie = request
            .cookies()
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        headers.push((COOKIE.to_string(), cookie));
    }

    if !request.has_header(USER_AGENT) && !request.user_agent().is_empty() {
        headers.push((USER_AGENT.to_string(), request.user_agent().to_string()));
    }

    headers
}

/// Resolve a descriptor into what the transport sends on each attempt
pub fn prepare_transport_request(request: &RequestDescriptor) -> TransportRequest {
    let body = request
        .body()
        .filter(|body| request.method().allows_body() && !body.is_empty())
        .map(<[u8]>::to_vec);

    TransportRequest {
        method: request.method(),
        url: request.url().to_string(),
        headers: finalize_headers(request),
        body,
        timeout: request.timeout(),
        redirects: request.redirects(),
        verify_ssl: request.verify_ssl(),
        proxy: request.proxy().map(str::to_string),
    }
}

fn normalize(request: &RequestDescriptor, raw: RawResponse, attempts: u32) -> Response {
    let status = parse_status(&raw.header_lines);
    let NormalizedHeaders { headers, cookies } = normalize_headers(&raw.header_lines);
    let format = resolve_format(request.format(), &headers);
    let parsed = decode_body(format, &raw.body);

    Response {
        success: true,
        status,
        raw_body: Some(raw.body),
        parsed,
        headers,
        cookies,
        error: None,
        attempts,
        format: Some(format),
    }
}
