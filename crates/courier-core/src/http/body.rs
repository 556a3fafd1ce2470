//! Request body payloads and form encoding

use serde_json::Value;
use url::form_urlencoded;

/// Content type sent with JSON bodies
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// Content type sent with form-encoded bodies
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// A request body as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Sent as-is
    Raw(Vec<u8>),
    /// Mapping or array, form-url-encoded before sending
    Form(Value),
}

impl Body {
    /// Interpret a loosely-typed value: strings are raw text, mappings and
    /// arrays are form data, other scalars are sent as their JSON text.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Body::Raw(text.into_bytes()),
            Value::Object(_) | Value::Array(_) => Body::Form(value),
            Value::Null => Body::Raw(Vec::new()),
            other => Body::Raw(other.to_string().into_bytes()),
        }
    }

    /// Encode into the bytes placed on the wire
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Body::Raw(bytes) => bytes,
            Body::Form(value) => encode_form_value(&value).into_bytes(),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Raw(text.into_bytes())
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Raw(text.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Raw(bytes)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::from_value(value)
    }
}

/// Form-encode flat `(name, value)` pairs
pub fn encode_form_pairs<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        serializer.append_pair(name.as_ref(), value.as_ref());
    }
    serializer.finish()
}

/// Form-encode a structured value.
///
/// Nested mappings and arrays use bracket keys (`user[name]=x`,
/// `tags[0]=a`); a top-level array uses its indices as keys. Booleans
/// become `1`/`0` and nulls are skipped.
pub fn encode_form_value(value: &Value) -> String {
    let mut pairs = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                flatten(key.clone(), item, &mut pairs);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(index.to_string(), item, &mut pairs);
            }
        }
        Value::Null => {}
        scalar => return scalar_text(scalar).unwrap_or_default(),
    }
    encode_form_pairs(pairs)
}

fn flatten(key: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (sub, item) in map {
                flatten(format!("{}[{}]", key, sub), item, pairs);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(format!("{}[{}]", key, index), item, pairs);
            }
        }
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                pairs.push((key, text));
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some("0".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Object(_) | Value::Array(_) => None,
    }
}
