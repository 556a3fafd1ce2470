//! Core data types shared by the request builder and the executor

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// HTTP request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
}

impl Method {
    /// Uppercase wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
        }
    }

    /// Whether a request body is attached for this method.
    ///
    /// GET, HEAD and OPTIONS never carry a body, even when one was set.
    pub fn allows_body(&self) -> bool {
        !matches!(self, Method::Get | Method::Head | Method::Options)
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            "TRACE" => Ok(Method::Trace),
            "CONNECT" => Ok(Method::Connect),
            _ => Err(Error::InvalidMethod {
                method: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Method {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
            Method::Trace => reqwest::Method::TRACE,
            Method::Connect => reqwest::Method::CONNECT,
        }
    }
}

/// Expected response format, governing how the body is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Detect from the response `Content-Type`
    #[default]
    Auto,
    /// Decode as JSON
    Json,
    /// Decode as an XML document
    Xml,
    /// Pass the body through as text
    Text,
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseFormat::Auto => write!(f, "auto"),
            ResponseFormat::Json => write!(f, "json"),
            ResponseFormat::Xml => write!(f, "xml"),
            ResponseFormat::Text => write!(f, "text"),
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(ResponseFormat::Auto),
            "json" => Ok(ResponseFormat::Json),
            "xml" => Ok(ResponseFormat::Xml),
            "text" => Ok(ResponseFormat::Text),
            other => Err(Error::configuration(format!(
                "Unknown response format '{}', expected auto, json, xml or text",
                other
            ))),
        }
    }
}

/// Whether a 4xx/5xx status counts as a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusPolicy {
    /// Only transport-level failures fail an attempt
    #[default]
    TransportOnly,
    /// Responses with a 4xx or 5xx status also fail the attempt and are retried
    ErrorStatusFails,
}

impl StatusPolicy {
    /// Check whether a parsed status should fail the attempt under this policy
    pub fn rejects(&self, status: Option<u16>) -> bool {
        match self {
            StatusPolicy::TransportOnly => false,
            StatusPolicy::ErrorStatusFails => matches!(status, Some(400..=599)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("Post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!(" patch ".parse::<Method>().unwrap(), Method::Patch);
        assert!("FETCH".parse::<Method>().is_err());
    }

    #[test]
    fn test_method_display_is_uppercase() {
        assert_eq!(Method::Options.to_string(), "OPTIONS");
        assert_eq!(Method::default(), Method::Get);
    }

    #[test]
    fn test_body_allowed_methods() {
        assert!(!Method::Get.allows_body());
        assert!(!Method::Head.allows_body());
        assert!(!Method::Options.allows_body());
        assert!(Method::Post.allows_body());
        assert!(Method::Delete.allows_body());
    }

    #[test]
    fn test_method_serde() {
        let method: Method = serde_json::from_str("\"delete\"").unwrap();
        assert_eq!(method, Method::Delete);
        assert_eq!(serde_json::to_string(&method).unwrap(), "\"DELETE\"");
    }

    #[test]
    fn test_response_format_parsing() {
        assert_eq!("JSON".parse::<ResponseFormat>().unwrap(), ResponseFormat::Json);
        assert_eq!("text".parse::<ResponseFormat>().unwrap(), ResponseFormat::Text);
        assert!("yaml".parse::<ResponseFormat>().is_err());
    }

    #[test]
    fn test_status_policy() {
        assert!(!StatusPolicy::TransportOnly.rejects(Some(500)));
        assert!(StatusPolicy::ErrorStatusFails.rejects(Some(404)));
        assert!(StatusPolicy::ErrorStatusFails.rejects(Some(503)));
        assert!(!StatusPolicy::ErrorStatusFails.rejects(Some(302)));
        assert!(!StatusPolicy::ErrorStatusFails.rejects(None));
    }
}
