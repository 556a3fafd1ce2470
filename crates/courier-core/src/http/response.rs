//! Normalized response record returned by every dispatch

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::http::error::TransportError;
use crate::types::ResponseFormat;

/// Value of a response header: one occurrence or several
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// First value received
    pub fn first(&self) -> &str {
        match self {
            HeaderValue::Single(value) => value,
            HeaderValue::Multiple(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values in the order received
    pub fn values(&self) -> Vec<&str> {
        match self {
            HeaderValue::Single(value) => vec![value.as_str()],
            HeaderValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            HeaderValue::Single(existing) => {
                *self = HeaderValue::Multiple(vec![std::mem::take(existing), value]);
            }
            HeaderValue::Multiple(values) => values.push(value),
        }
    }
}

/// Response headers with case-insensitive lookup.
///
/// Names keep the spelling of their first occurrence. A name seen again (in
/// any case) turns its value into [`HeaderValue::Multiple`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: Vec<(String, HeaderValue)>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of a header
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((name, HeaderValue::Single(value))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// First value of a header
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).map(HeaderValue::first)
    }

    /// All values of a header, empty when absent
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.get(name).map(HeaderValue::values).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

impl Serialize for ResponseHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", content = "value", rename_all = "lowercase")]
pub enum ParsedBody {
    Json(Value),
    /// XML document converted into a structured value
    Xml(Value),
    Text(String),
}

impl ParsedBody {
    /// Structured value for JSON and XML bodies
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ParsedBody::Json(value) | ParsedBody::Xml(value) => Some(value),
            ParsedBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParsedBody::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Format this body was decoded as
    pub fn format(&self) -> ResponseFormat {
        match self {
            ParsedBody::Json(_) => ResponseFormat::Json,
            ParsedBody::Xml(_) => ResponseFormat::Xml,
            ParsedBody::Text(_) => ResponseFormat::Text,
        }
    }
}

/// Outcome of one dispatched request, retries included
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// True iff the final attempt produced a response
    pub success: bool,
    /// Status code parsed from the status line
    pub status: Option<u16>,
    #[serde(serialize_with = "serialize_lossy")]
    pub raw_body: Option<Vec<u8>>,
    /// Decoded body, absent on failure or when decoding failed
    pub parsed: Option<ParsedBody>,
    pub headers: ResponseHeaders,
    /// Cookies set by the server, name to value
    pub cookies: BTreeMap<String, String>,
    /// Error of the final attempt when `success` is false
    pub error: Option<TransportError>,
    /// Number of attempts made, at least 1
    pub attempts: u32,
    /// Format the body was decoded as
    pub format: Option<ResponseFormat>,
}

impl Response {
    /// Record for a request whose final attempt failed
    pub fn failure(error: TransportError, attempts: u32) -> Self {
        Self {
            success: false,
            status: None,
            raw_body: None,
            parsed: None,
            headers: ResponseHeaders::new(),
            cookies: BTreeMap::new(),
            error: Some(error),
            attempts,
            format: None,
        }
    }

    /// Raw body as text, replacing invalid UTF-8
    pub fn body_text(&self) -> Option<Cow<'_, str>> {
        self.raw_body
            .as_deref()
            .map(|bytes| String::from_utf8_lossy(bytes))
    }

    /// First value of a response header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.first(name)
    }

    /// Check for a 2xx status
    pub fn is_success_status(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }
}

fn serialize_lossy<S: Serializer>(
    body: &Option<Vec<u8>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match body {
        Some(bytes) => serializer.serialize_some(&String::from_utf8_lossy(bytes)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repeated_headers_accumulate() {
        let headers: ResponseHeaders = [("X-Trace", "1"), ("x-trace", "2"), ("Server", "t")]
            .into_iter()
            .collect();

        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers.get("X-TRACE"),
            Some(&HeaderValue::Multiple(vec!["1".to_string(), "2".to_string()]))
        );
        assert_eq!(headers.first("server"), Some("t"));
        assert_eq!(headers.get_all("missing"), Vec::<&str>::new());
    }

    #[test]
    fn test_first_spelling_is_kept() {
        let headers: ResponseHeaders = [("Content-Type", "a"), ("content-type", "b")]
            .into_iter()
            .collect();
        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Content-Type"]);
    }

    #[test]
    fn test_headers_serialize_as_map() {
        let headers: ResponseHeaders = [("A", "1"), ("B", "x"), ("B", "y")].into_iter().collect();
        assert_eq!(
            serde_json::to_value(&headers).unwrap(),
            json!({"A": "1", "B": ["x", "y"]})
        );
    }

    #[test]
    fn test_failure_record() {
        let response = Response::failure(TransportError::NoResponse, 3);
        assert!(!response.success);
        assert_eq!(response.attempts, 3);
        assert!(response.raw_body.is_none());
        assert!(response.parsed.is_none());
        assert!(response.body_text().is_none());
    }

    #[test]
    fn test_parsed_body_accessors() {
        let parsed = ParsedBody::Json(json!({"a": 1}));
        assert_eq!(parsed.as_value(), Some(&json!({"a": 1})));
        assert_eq!(parsed.format(), ResponseFormat::Json);
        assert_eq!(ParsedBody::Text("hi".into()).as_text(), Some("hi"));
    }
}
