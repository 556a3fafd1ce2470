//! Request builder producing immutable request descriptors
//!
//! A [`RequestBuilder`] accumulates everything needed for one logical request
//! and is consumed by [`RequestBuilder::build`]. The resulting
//! [`RequestDescriptor`] is never modified afterwards; reusing a builder for a
//! different request means starting a new one.

use std::time::Duration;

use serde::Serialize;

use crate::http::auth::{Auth, AUTHORIZATION};
use crate::http::body::{encode_form_pairs, Body, CONTENT_TYPE_FORM, CONTENT_TYPE_JSON};
use crate::http::retry::RetryPolicy;
use crate::types::{Method, ResponseFormat, StatusPolicy};
use crate::Result;

/// Name of the content type header
pub const CONTENT_TYPE: &str = "Content-Type";

/// Redirect cap used when following is enabled without an explicit maximum
pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

/// User agent sent when the caller never sets one
pub fn default_user_agent() -> String {
    format!("courier/{}", crate::VERSION)
}

/// Redirect handling for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectPolicy {
    /// Whether redirects are followed at all
    pub follow: bool,
    /// Maximum number of redirects, only meaningful when `follow` is set
    pub max: u32,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self {
            follow: false,
            max: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// Fully configured, not yet dispatched request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    cookies: Vec<(String, String)>,
    timeout: Option<Duration>,
    redirects: RedirectPolicy,
    verify_ssl: bool,
    proxy: Option<String>,
    retry: RetryPolicy,
    format: ResponseFormat,
    user_agent: String,
    status_policy: StatusPolicy,
}

impl Default for RequestDescriptor {
    fn default() -> Self {
        Self {
            method: Method::Get,
            url: String::new(),
            headers: Vec::new(),
            body: None,
            cookies: Vec::new(),
            timeout: None,
            redirects: RedirectPolicy::default(),
            verify_ssl: true,
            proxy: None,
            retry: RetryPolicy::default(),
            format: ResponseFormat::Auto,
            user_agent: default_user_agent(),
            status_policy: StatusPolicy::TransportOnly,
        }
    }
}

impl RequestDescriptor {
    /// Start building a request
    pub fn builder(method: Method, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers in the order they were added, duplicates included
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Check whether a header is present, matched case-insensitively
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn cookies(&self) -> &[(String, String)] {
        &self.cookies
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn redirects(&self) -> RedirectPolicy {
        self.redirects
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn status_policy(&self) -> StatusPolicy {
        self.status_policy
    }
}

/// Chainable builder for [`RequestDescriptor`]
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    descriptor: RequestDescriptor,
}

impl RequestBuilder {
    /// Create a new request builder
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            descriptor: RequestDescriptor {
                method,
                url: url.into(),
                ..RequestDescriptor::default()
            },
        }
    }

    /// Set the method
    pub fn method(mut self, method: Method) -> Self {
        self.descriptor.method = method;
        self
    }

    /// Set the URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.descriptor.url = url.into();
        self
    }

    /// Append a header; existing headers with the same name are kept
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor.headers.push((name.into(), value.into()));
        self
    }

    /// Append several headers
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.descriptor
            .headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the raw body. Mapping and array values are form-url-encoded.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.descriptor.body = Some(body.into().into_bytes());
        self
    }

    /// Serialize `value` as the JSON body and set `Content-Type: application/json`
    pub fn json_body<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(value)?;
        self.descriptor.body = Some(bytes);
        self.replace_header(CONTENT_TYPE, CONTENT_TYPE_JSON);
        Ok(self)
    }

    /// Form-encode `pairs` as the body and set the form content type
    pub fn form_data<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.descriptor.body = Some(encode_form_pairs(pairs).into_bytes());
        self.replace_header(CONTENT_TYPE, CONTENT_TYPE_FORM);
        self
    }

    /// Add a cookie sent in the `Cookie` header
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor.cookies.push((name.into(), value.into()));
        self
    }

    /// Add several cookies
    pub fn cookies<I, K, V>(mut self, cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.descriptor
            .cookies
            .extend(cookies.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the `Authorization` header, replacing any previous one
    pub fn auth(mut self, auth: Auth) -> Self {
        self.replace_header(AUTHORIZATION, &auth.header_value());
        self
    }

    /// Set `Authorization: {kind} {credentials}`
    pub fn authorization(self, kind: impl Into<String>, credentials: impl Into<String>) -> Self {
        self.auth(Auth::Custom {
            kind: kind.into(),
            credentials: credentials.into(),
        })
    }

    /// Add basic authentication
    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth(Auth::Basic {
            username: username.into(),
            password: password.into(),
        })
    }

    /// Add bearer token authorization
    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.auth(Auth::Bearer(token.into()))
    }

    /// Per-attempt timeout enforced by the transport
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.descriptor.timeout = Some(timeout);
        self
    }

    /// Configure redirect following
    pub fn follow_redirects(mut self, follow: bool, max: u32) -> Self {
        self.descriptor.redirects = RedirectPolicy { follow, max };
        self
    }

    /// Enable or disable certificate and hostname verification together
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.descriptor.verify_ssl = verify;
        self
    }

    /// Override the default user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.descriptor.user_agent = user_agent.into();
        self
    }

    /// Route the request through a proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.descriptor.proxy = Some(proxy.into());
        self
    }

    /// Retry failed attempts `retries` times, waiting `delay` before each
    pub fn retry(mut self, retries: u32, delay: Duration) -> Self {
        self.descriptor.retry.retries = retries;
        self.descriptor.retry.delay = delay;
        self
    }

    /// Replace the whole retry policy
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.descriptor.retry = policy;
        self
    }

    /// Set the expected response format
    pub fn expect_format(mut self, format: ResponseFormat) -> Self {
        self.descriptor.format = format;
        self
    }

    /// Decide whether 4xx/5xx statuses fail the attempt
    pub fn status_policy(mut self, policy: StatusPolicy) -> Self {
        self.descriptor.status_policy = policy;
        self
    }

    /// Finish building
    pub fn build(self) -> RequestDescriptor {
        self.descriptor
    }

    fn replace_header(&mut self, name: &str, value: &str) {
        self.descriptor
            .headers
            .retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.descriptor
            .headers
            .push((name.to_string(), value.to_string()));
    }
}

impl From<RequestBuilder> for RequestDescriptor {
    fn from(builder: RequestBuilder) -> Self {
        builder.build()
    }
}
