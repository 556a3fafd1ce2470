//! Normalization of raw transport output into response fields
//!
//! Covers status line parsing, header accumulation, `Set-Cookie`
//! extraction, response format resolution and body decoding.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::http::response::{ParsedBody, ResponseHeaders};
use crate::http::xml::parse_xml;
use crate::types::ResponseFormat;

static STATUS_LINE_REGEX: OnceLock<Regex> = OnceLock::new();

fn status_line_regex() -> &'static Regex {
    STATUS_LINE_REGEX.get_or_init(|| {
        Regex::new(r"^HTTP/\S+\s+(\d{3})").expect("status line pattern is valid")
    })
}

/// Status code from the first header line, `None` when it is not a status line
pub fn parse_status(header_lines: &[String]) -> Option<u16> {
    let first = header_lines.first()?;
    status_line_regex()
        .captures(first)
        .and_then(|captures| captures.get(1))
        .and_then(|code| code.as_str().parse().ok())
}

/// Headers and cookies extracted from raw header lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedHeaders {
    pub headers: ResponseHeaders,
    pub cookies: BTreeMap<String, String>,
}

/// Split `Name: Value` lines into headers and collect `Set-Cookie` values.
///
/// The status line and lines without a colon are skipped. Names and values
/// are trimmed. A cookie set twice keeps its last value.
pub fn normalize_headers(header_lines: &[String]) -> NormalizedHeaders {
    let mut normalized = NormalizedHeaders::default();

    for (index, line) in header_lines.iter().enumerate() {
        if index == 0 && status_line_regex().is_match(line) {
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        if name.eq_ignore_ascii_case("set-cookie") {
            if let Some((cookie, cookie_value)) = parse_set_cookie(value) {
                normalized.cookies.insert(cookie, cookie_value);
            }
        }
        normalized.headers.append(name, value);
    }

    normalized
}

/// Name and value from the first `;`-separated token of a `Set-Cookie` value
pub fn parse_set_cookie(value: &str) -> Option<(String, String)> {
    let first = value.split(';').next()?;
    let (name, value) = first.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// Format used to decode the body.
///
/// Explicit formats are returned as-is. `Auto` looks at the first
/// `Content-Type` value: JSON for `application/json`, XML for
/// `application/xml` or `text/xml`, text otherwise.
pub fn resolve_format(requested: ResponseFormat, headers: &ResponseHeaders) -> ResponseFormat {
    if requested != ResponseFormat::Auto {
        return requested;
    }

    let content_type = headers
        .first("content-type")
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if content_type.contains("application/json") {
        ResponseFormat::Json
    } else if content_type.contains("application/xml") || content_type.contains("text/xml") {
        ResponseFormat::Xml
    } else {
        ResponseFormat::Text
    }
}

/// Decode a body in the resolved format, `None` when it does not parse
pub fn decode_body(format: ResponseFormat, body: &[u8]) -> Option<ParsedBody> {
    match format {
        ResponseFormat::Json => serde_json::from_slice(body).ok().map(ParsedBody::Json),
        ResponseFormat::Xml => parse_xml(body).ok().map(ParsedBody::Xml),
        ResponseFormat::Text | ResponseFormat::Auto => {
            Some(ParsedBody::Text(String::from_utf8_lossy(body).into_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::HeaderValue;
    use serde_json::json;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(parse_status(&lines(&["HTTP/1.1 404 Not Found"])), Some(404));
        assert_eq!(parse_status(&lines(&["HTTP/2 200"])), Some(200));
        assert_eq!(parse_status(&lines(&["HTTP/1.0   301 Moved"])), Some(301));
        assert_eq!(parse_status(&[]), None);
        assert_eq!(parse_status(&lines(&["Content-Type: text/plain"])), None);
        assert_eq!(parse_status(&lines(&["HTTP/1.1 20 Short"])), None);
    }

    #[test]
    fn test_header_accumulation() {
        let normalized = normalize_headers(&lines(&[
            "HTTP/1.1 200 OK",
            "X-Trace: a",
            "x-trace: b",
            "Content-Type:  application/json ",
            "garbage line",
            "Location: http://h:8080/next",
        ]));

        assert_eq!(
            normalized.headers.get("X-Trace"),
            Some(&HeaderValue::Multiple(vec!["a".into(), "b".into()]))
        );
        assert_eq!(normalized.headers.first("content-type"), Some("application/json"));
        assert_eq!(normalized.headers.first("location"), Some("http://h:8080/next"));
        assert_eq!(normalized.headers.len(), 3);
    }

    #[test]
    fn test_set_cookie_extraction() {
        let normalized = normalize_headers(&lines(&[
            "HTTP/1.1 200 OK",
            "Set-Cookie: sid=abc; Path=/",
            "set-cookie: theme=dark",
        ]));

        let expected: BTreeMap<String, String> = [("sid", "abc"), ("theme", "dark")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(normalized.cookies, expected);
        assert_eq!(normalized.headers.get_all("Set-Cookie").len(), 2);
    }

    #[test]
    fn test_set_cookie_value_with_equals() {
        assert_eq!(
            parse_set_cookie("token=a=b; HttpOnly"),
            Some(("token".to_string(), "a=b".to_string()))
        );
        assert_eq!(parse_set_cookie("novalue"), None);
    }

    #[test]
    fn test_format_resolution() {
        let json: ResponseHeaders = [("Content-Type", "application/json; charset=utf-8")]
            .into_iter()
            .collect();
        let xml: ResponseHeaders = [("content-type", "text/xml")].into_iter().collect();
        let html: ResponseHeaders = [("Content-Type", "text/html")].into_iter().collect();

        assert_eq!(resolve_format(ResponseFormat::Auto, &json), ResponseFormat::Json);
        assert_eq!(resolve_format(ResponseFormat::Auto, &xml), ResponseFormat::Xml);
        assert_eq!(resolve_format(ResponseFormat::Auto, &html), ResponseFormat::Text);
        assert_eq!(
            resolve_format(ResponseFormat::Auto, &ResponseHeaders::new()),
            ResponseFormat::Text
        );
        assert_eq!(resolve_format(ResponseFormat::Text, &json), ResponseFormat::Text);
    }

    #[test]
    fn test_body_decoding() {
        assert_eq!(
            decode_body(ResponseFormat::Json, br#"{"a":1}"#),
            Some(ParsedBody::Json(json!({"a": 1})))
        );
        assert_eq!(decode_body(ResponseFormat::Json, b"not json"), None);
        assert_eq!(
            decode_body(ResponseFormat::Text, br#"{"a":1}"#),
            Some(ParsedBody::Text(r#"{"a":1}"#.to_string()))
        );
        assert_eq!(
            decode_body(ResponseFormat::Xml, b"<a>1</a>"),
            Some(ParsedBody::Xml(json!({"a": "1"})))
        );
        assert_eq!(decode_body(ResponseFormat::Xml, b"<a>"), None);
        assert_eq!(decode_body(ResponseFormat::Xml, b"<a>1</a><b>2</b>"), None);
    }
}
