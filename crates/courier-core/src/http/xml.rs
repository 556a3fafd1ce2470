//! XML response decoding
//!
//! Converts a document into a JSON-like value with quick-xml:
//! - the root element becomes a single-key object, `{"root": ...}`
//! - attributes are stored with an `@` prefix
//! - an element holding only text becomes a string
//! - text next to attributes or children is stored under `#text`
//! - repeated child elements become arrays
//! - an empty element without attributes becomes `null`

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::attributes::Attributes;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

const ATTRIBUTE_PREFIX: &str = "@";
const TEXT_KEY: &str = "#text";

/// Error raised for malformed documents
#[derive(Debug, thiserror::Error)]
#[error("XML parse error: {0}")]
pub struct XmlError(String);

struct Element {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

/// Decode an XML document into a structured value.
///
/// The whole input is read: a second root element or any content after
/// the root other than whitespace, comments and processing instructions
/// is an error.
pub fn parse_xml(bytes: &[u8]) -> Result<Value, XmlError> {
    let mut reader = Reader::from_reader(bytes);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError("multiple root elements".to_string()));
                }
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut fields = Map::new();
                read_attributes(e.attributes(), &mut fields)?;
                stack.push(Element {
                    name,
                    fields,
                    text: String::new(),
                });
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError("unexpected closing tag".to_string()))?;
                let name = element.name.clone();
                let value = finish(element);
                match stack.last_mut() {
                    Some(parent) => add_child(&mut parent.fields, name, value),
                    None => root = Some(single(name, value)),
                }
            }
            Ok(Event::Empty(e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError("multiple root elements".to_string()));
                }
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut fields = Map::new();
                read_attributes(e.attributes(), &mut fields)?;
                let value = if fields.is_empty() {
                    Value::Null
                } else {
                    Value::Object(fields)
                };
                match stack.last_mut() {
                    Some(parent) => add_child(&mut parent.fields, name, value),
                    None => root = Some(single(name, value)),
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.decode().map_err(|e| XmlError(e.to_string()))?;
                match stack.last_mut() {
                    Some(element) => element.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(XmlError("text outside the root element".to_string())),
                }
            }
            Ok(Event::CData(e)) => {
                let element = stack
                    .last_mut()
                    .ok_or_else(|| XmlError("CDATA outside the root element".to_string()))?;
                element
                    .text
                    .push_str(&String::from_utf8_lossy(e.into_inner().as_ref()));
            }
            Ok(Event::GeneralRef(e)) => {
                let element = stack
                    .last_mut()
                    .ok_or_else(|| XmlError("entity outside the root element".to_string()))?;
                let name = e.decode().map_err(|e| XmlError(e.to_string()))?;
                let resolved = resolve_reference(&name)
                    .ok_or_else(|| XmlError(format!("unknown entity '&{};'", name)))?;
                element.text.push_str(&resolved);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(XmlError(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(XmlError("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| XmlError("document has no root element".to_string()))
}

fn read_attributes(
    attributes: Attributes<'_>,
    fields: &mut Map<String, Value>,
) -> Result<(), XmlError> {
    for attribute in attributes {
        let attribute = attribute.map_err(|e| XmlError(e.to_string()))?;
        let key = format!(
            "{}{}",
            ATTRIBUTE_PREFIX,
            String::from_utf8_lossy(attribute.key.as_ref())
        );
        let value = attribute
            .unescape_value()
            .map_err(|e| XmlError(e.to_string()))?;
        fields.insert(key, Value::String(value.into_owned()));
    }
    Ok(())
}

fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    resolve_predefined_entity(name).map(str::to_string)
}

fn finish(element: Element) -> Value {
    let text = element.text.trim();
    let mut fields = element.fields;

    if fields.is_empty() {
        if text.is_empty() {
            Value::Null
        } else {
            Value::String(text.to_string())
        }
    } else {
        if !text.is_empty() {
            fields.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
        }
        Value::Object(fields)
    }
}

fn add_child(parent: &mut Map<String, Value>, name: String, value: Value) {
    match parent.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.insert(name, value);
        }
    }
}

fn single(name: String, value: Value) -> Value {
    let mut root = Map::new();
    root.insert(name, value);
    Value::Object(root)
}
