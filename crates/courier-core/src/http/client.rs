//! Client facade over the builder and executor
//!
//! Provides request construction seeded with client-wide defaults, dispatch,
//! one-shot convenience wrappers and file download.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::http::body::Body;
use crate::http::builder::{default_user_agent, RequestBuilder, RequestDescriptor};
use crate::http::config::RequestConfig;
use crate::http::error::TransportError;
use crate::http::executor::Executor;
use crate::http::logger::RequestLogger;
use crate::http::response::Response;
use crate::http::retry::RetryPolicy;
use crate::http::transport::{ReqwestTransport, Transport};
use crate::types::{Method, ResponseFormat, StatusPolicy};
use crate::Result;

/// Defaults applied to every request built by a [`Client`]
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub user_agent: String,
    /// Per-attempt timeout, `None` keeps the transport default
    pub timeout: Option<Duration>,
    pub retry_policy: RetryPolicy,
    pub verify_ssl: bool,
    /// Follow up to this many redirects, `None` disables following
    pub max_redirects: Option<u32>,
    pub proxy: Option<String>,
    pub format: ResponseFormat,
    pub status_policy: StatusPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: None,
            retry_policy: RetryPolicy::default(),
            verify_ssl: true,
            max_redirects: None,
            proxy: None,
            format: ResponseFormat::Auto,
            status_policy: StatusPolicy::TransportOnly,
        }
    }
}

/// Blocking HTTP client
#[derive(Debug, Clone)]
pub struct Client {
    executor: Executor,
    config: ClientConfig,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a client using the reqwest transport
    pub fn new() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new()))
    }

    /// Create a client over a custom transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            executor: Executor::new(transport),
            config: ClientConfig::default(),
        }
    }

    /// Replace the client-wide request defaults
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Report request start and completion to `logger`
    pub fn with_logger(mut self, logger: impl RequestLogger + 'static) -> Self {
        self.executor = self.executor.with_logger(Arc::new(logger));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a request seeded with the client defaults
    pub fn build_request(&self, method: Method, url: impl Into<String>) -> RequestBuilder {
        let config = &self.config;
        let mut builder = RequestBuilder::new(method, url)
            .user_agent(config.user_agent.clone())
            .verify_ssl(config.verify_ssl)
            .retry_policy(config.retry_policy.clone())
            .expect_format(config.format)
            .status_policy(config.status_policy);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(max) = config.max_redirects {
            builder = builder.follow_redirects(true, max);
        }
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(proxy.clone());
        }
        builder
    }

    /// Execute a request
    pub fn dispatch(&self, request: impl Into<RequestDescriptor>) -> Response {
        let request = request.into();
        self.executor.execute(&request)
    }

    /// Build and execute a request from a configuration record.
    ///
    /// The record is applied on top of the client defaults. Transport and
    /// status failures are reported on the returned [`Response`]; the `Err`
    /// case only covers a `JsonBody` that cannot be serialized.
    pub fn request_from_config(&self, config: RequestConfig) -> Result<Response> {
        let builder = config.apply(self.build_request(Method::Get, ""))?;
        Ok(self.dispatch(builder))
    }

    pub fn get(&self, url: &str, headers: &[(&str, &str)]) -> Response {
        self.dispatch(self.build_request(Method::Get, url).headers(headers.iter().copied()))
    }

    pub fn post(&self, url: &str, body: impl Into<Body>, headers: &[(&str, &str)]) -> Response {
        self.send_with_body(Method::Post, url, body.into(), headers)
    }

    /// POST `value` serialized as JSON
    pub fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        value: &T,
        headers: &[(&str, &str)],
    ) -> Result<Response> {
        let builder = self
            .build_request(Method::Post, url)
            .headers(headers.iter().copied())
            .json_body(value)?;
        Ok(self.dispatch(builder))
    }

    pub fn put(&self, url: &str, body: impl Into<Body>, headers: &[(&str, &str)]) -> Response {
        self.send_with_body(Method::Put, url, body.into(), headers)
    }

    pub fn delete(&self, url: &str, headers: &[(&str, &str)]) -> Response {
        self.dispatch(self.build_request(Method::Delete, url).headers(headers.iter().copied()))
    }

    pub fn patch(&self, url: &str, body: impl Into<Body>, headers: &[(&str, &str)]) -> Response {
        self.send_with_body(Method::Patch, url, body.into(), headers)
    }

    /// GET `url` and write the body to `path`.
    ///
    /// Returns false when the request fails or the file cannot be written.
    /// Nothing is written on request failure.
    pub fn download(&self, url: &str, path: impl AsRef<Path>) -> bool {
        let response = self.get(url, &[]);
        match write_download(&response, path.as_ref()) {
            Ok(()) => true,
            Err(DownloadError::Transport(error)) => {
                tracing::warn!(url, error = %error, "Download failed");
                false
            }
            Err(DownloadError::Write(error)) => {
                tracing::warn!(
                    url,
                    path = %path.as_ref().display(),
                    error = %error,
                    "Could not write downloaded file"
                );
                false
            }
        }
    }

    fn send_with_body(
        &self,
        method: Method,
        url: &str,
        body: Body,
        headers: &[(&str, &str)],
    ) -> Response {
        self.dispatch(
            self.build_request(method, url)
                .headers(headers.iter().copied())
                .body(body),
        )
    }
}

enum DownloadError {
    Transport(TransportError),
    Write(std::io::Error),
}

fn write_download(response: &Response, path: &Path) -> std::result::Result<(), DownloadError> {
    if !response.success {
        let error = response.error.clone().unwrap_or(TransportError::NoResponse);
        return Err(DownloadError::Transport(error));
    }
    let body = response.raw_body.as_deref().unwrap_or_default();
    std::fs::write(path, body).map_err(DownloadError::Write)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::transport::{RawResponse, TransportRequest};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<TransportRequest>>,
    }

    impl Transport for Recorder {
        fn send(
            &self,
            request: &TransportRequest,
        ) -> std::result::Result<RawResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(RawResponse::new("HTTP/1.1 204 No Content", Vec::<String>::new(), ""))
        }
    }

    #[test]
    fn test_build_request_uses_client_defaults() {
        let config = ClientConfig {
            user_agent: "suite/2".to_string(),
            timeout: Some(Duration::from_secs(3)),
            retry_policy: RetryPolicy::new(2, Duration::from_millis(5)),
            verify_ssl: false,
            max_redirects: Some(4),
            proxy: Some("http://p:1".to_string()),
            format: ResponseFormat::Text,
            status_policy: StatusPolicy::ErrorStatusFails,
        };
        let client = Client::with_transport(Arc::new(Recorder::default())).with_config(config);

        let request = client.build_request(Method::Get, "http://h").build();

        assert_eq!(request.user_agent(), "suite/2");
        assert_eq!(request.timeout(), Some(Duration::from_secs(3)));
        assert_eq!(request.retry().retries, 2);
        assert!(!request.verify_ssl());
        assert!(request.redirects().follow);
        assert_eq!(request.redirects().max, 4);
        assert_eq!(request.proxy(), Some("http://p:1"));
        assert_eq!(request.format(), ResponseFormat::Text);
        assert_eq!(request.status_policy(), StatusPolicy::ErrorStatusFails);
    }

    #[test]
    fn test_convenience_methods() {
        let recorder = Arc::new(Recorder::default());
        let client = Client::with_transport(recorder.clone());

        client.get("http://h/a", &[("X-A", "1")]);
        client.post("http://h/b", "payload", &[]);
        client.post_json("http://h/c", &serde_json::json!({"k": true}), &[]).unwrap();
        client.put("http://h/d", "p", &[]);
        client.delete("http://h/e", &[]);
        client.patch("http://h/f", "p", &[]);

        let seen = recorder.seen.lock().unwrap();
        let methods: Vec<_> = seen.iter().map(|r| r.method).collect();
        assert_eq!(
            methods,
            vec![
                Method::Get,
                Method::Post,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Patch,
            ]
        );
        assert!(seen[0].headers.contains(&("X-A".to_string(), "1".to_string())));
        assert_eq!(seen[1].body, Some(b"payload".to_vec()));
        assert_eq!(seen[2].body, Some(br#"{"k":true}"#.to_vec()));
        assert!(seen[2]
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
    }

    #[test]
    fn test_request_from_config() {
        let recorder = Arc::new(Recorder::default());
        let client = Client::with_transport(recorder.clone());
        let config =
            RequestConfig::from_json(r#"{"Method": "PUT", "URL": "http://h/x", "Body": "b"}"#)
                .unwrap();

        let response = client.request_from_config(config).unwrap();

        assert!(response.success);
        assert_eq!(response.status, Some(204));
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Put);
        assert_eq!(seen[0].url, "http://h/x");
    }
}
