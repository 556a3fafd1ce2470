//! Typed configuration record
//!
//! A [`RequestConfig`] describes a whole request in one declarative record,
//! using PascalCase keys such as `Method`, `URL` or `RetryDelay`. Unknown
//! keys are rejected when the record is parsed.

use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::builder::{RequestBuilder, RequestDescriptor, DEFAULT_MAX_REDIRECTS};
use crate::http::retry::{RetryPolicy, DEFAULT_RETRY_DELAY};
use crate::types::{Method, ResponseFormat};
use crate::{Error, Result};

/// `Auth` entry: `Authorization: {Type} {Credentials}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(rename = "Type")]
    pub kind: String,
    pub credentials: String,
}

/// `BasicAuth` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct BasicAuthConfig {
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Declarative description of a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RequestConfig {
    pub method: Option<Method>,
    #[serde(rename = "URL")]
    pub url: Option<String>,
    pub header: Option<IndexMap<String, String>>,
    /// Raw string, or a mapping/array that is form-encoded
    pub body: Option<Value>,
    pub json_body: Option<Value>,
    pub form_data: Option<IndexMap<String, String>>,
    pub cookie: Option<IndexMap<String, String>>,
    pub auth: Option<AuthConfig>,
    pub basic_auth: Option<BasicAuthConfig>,
    /// Milliseconds
    pub timeout: Option<u64>,
    pub follow_redirects: Option<bool>,
    pub max_redirects: Option<u32>,
    #[serde(rename = "VerifySSL")]
    pub verify_ssl: Option<bool>,
    pub user_agent: Option<String>,
    pub proxy: Option<String>,
    /// Negative values are treated as 0
    pub retry: Option<i64>,
    /// Milliseconds, negative values are treated as 0
    pub retry_delay: Option<i64>,
    pub response_format: Option<ResponseFormat>,
}

impl RequestConfig {
    /// Parse a record from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Configuration {
            message: format!("invalid request config: {}", e),
            source: Some(e.into()),
        })
    }

    /// Parse a record from an already decoded value
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::Configuration {
            message: format!("invalid request config: {}", e),
            source: Some(e.into()),
        })
    }

    /// Load a JSON record from disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Io {
            message: format!("failed to read {}: {}", path.as_ref().display(), e),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Apply every present key on top of `builder`, in a fixed order:
    /// method, URL, headers, body, JSON body, form data, cookies, auth,
    /// basic auth, timeout, redirects, SSL verification, user agent,
    /// proxy, retry and response format. Later body keys win.
    pub fn apply(self, mut builder: RequestBuilder) -> Result<RequestBuilder> {
        if let Some(method) = self.method {
            builder = builder.method(method);
        }
        if let Some(url) = self.url {
            builder = builder.url(url);
        }
        if let Some(headers) = self.header {
            builder = builder.headers(headers);
        }
        if let Some(body) = self.body {
            builder = builder.body(body);
        }
        if let Some(json) = self.json_body {
            builder = builder.json_body(&json)?;
        }
        if let Some(form) = self.form_data {
            builder = builder.form_data(form);
        }
        if let Some(cookies) = self.cookie {
            builder = builder.cookies(cookies);
        }
        if let Some(auth) = self.auth {
            builder = builder.authorization(auth.kind, auth.credentials);
        }
        if let Some(basic) = self.basic_auth {
            builder = builder.basic_auth(basic.username, basic.password);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(Duration::from_millis(timeout));
        }
        if let Some(follow) = self.follow_redirects {
            let max = self.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS);
            builder = builder.follow_redirects(follow, max);
        }
        if let Some(verify) = self.verify_ssl {
            builder = builder.verify_ssl(verify);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if let Some(proxy) = self.proxy {
            builder = builder.proxy(proxy);
        }
        if let Some(retries) = self.retry {
            let delay = self
                .retry_delay
                .unwrap_or(DEFAULT_RETRY_DELAY.as_millis() as i64);
            builder = builder.retry_policy(RetryPolicy::clamped(retries, delay));
        }
        if let Some(format) = self.response_format {
            builder = builder.expect_format(format);
        }
        Ok(builder)
    }
}

impl RequestDescriptor {
    /// Build a fresh descriptor from a configuration record
    pub fn from_config(config: RequestConfig) -> Result<Self> {
        let builder = RequestBuilder::new(Method::Get, "");
        Ok(config.apply(builder)?.build())
    }
}
