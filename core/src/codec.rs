//! Request body encoders and response body parsers.
//!
//! # Design
//! Payloads are `serde_json` maps with insertion order preserved, so the
//! order a caller builds a payload in is the order it goes on the wire in
//! every format. Form encoding follows the bracket convention PHP-style
//! backends expect for nested data (`user[name]=x`, `tags[0]=a`).
//!
//! XML has no native notion of a mapping, so both directions follow fixed
//! rules:
//! - encoding wraps the payload in a synthetic `<root>` element; arrays
//!   become repeated sibling elements named after their key;
//! - decoding yields `{root_tag: value}` where a text-only element is its
//!   text, repeated child tags become arrays, attributes live under
//!   `"@attributes"` and text mixed with child elements under `"#text"`.

use bytes::Bytes;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::{DecodeError, DecoderKind, EncodeError};
use crate::types::ContentType;

/// Structured key-value data sent as a request body or query string.
pub type Payload = Map<String, Value>;

/// Name of the synthetic element wrapping XML request bodies.
pub const XML_ROOT: &str = "root";

const XML_ATTRIBUTES_KEY: &str = "@attributes";
const XML_TEXT_KEY: &str = "#text";

/// Encode `data` as a request body of the given content type.
pub fn encode(content_type: ContentType, data: &Payload) -> Result<Bytes, EncodeError> {
    match content_type {
        ContentType::Json => encode_json(data).map(Bytes::from),
        ContentType::FormEncoded => Ok(Bytes::from(encode_form(data))),
        ContentType::Xml | ContentType::XmlText => encode_xml(data).map(Bytes::from),
        ContentType::Html | ContentType::Text => {
            Err(EncodeError::UnsupportedContentType(content_type))
        }
    }
}

pub fn encode_json(data: &Payload) -> Result<Vec<u8>, EncodeError> {
    serde_json::to_vec(data).map_err(|e| EncodeError::Serialize(e.to_string()))
}

/// Encode `data` as `application/x-www-form-urlencoded`.
///
/// Booleans render as `1`/`0` and null values are skipped.
pub fn encode_form(data: &Payload) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in data {
        append_form_value(&mut serializer, key, value);
    }
    serializer.finish()
}

fn append_form_value(
    serializer: &mut form_urlencoded::Serializer<'_, String>,
    key: &str,
    value: &Value,
) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => {
            serializer.append_pair(key, if *flag { "1" } else { "0" });
        }
        Value::Number(number) => {
            serializer.append_pair(key, &number.to_string());
        }
        Value::String(text) => {
            serializer.append_pair(key, text);
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                append_form_value(serializer, &format!("{key}[{index}]"), item);
            }
        }
        Value::Object(map) => {
            for (child, item) in map {
                append_form_value(serializer, &format!("{key}[{child}]"), item);
            }
        }
    }
}

/// Parse a form-encoded body into a flat mapping of strings.
///
/// Bracketed keys are kept verbatim; a repeated key keeps its last value.
pub fn decode_form(body: &[u8]) -> Payload {
    form_urlencoded::parse(body)
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect()
}

pub fn decode_json(body: &[u8]) -> Result<Value, DecodeError> {
    serde_json::from_slice(body).map_err(|e| DecodeError::parse(DecoderKind::Json, e))
}

/// Parse a JSON body into a mapping. A top-level array maps its indices to
/// string keys; any other scalar is rejected.
pub fn decode_json_map(body: &[u8]) -> Result<Payload, DecodeError> {
    match decode_json(body)? {
        Value::Object(map) => Ok(map),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect()),
        other => Err(DecodeError::parse(
            DecoderKind::Json,
            format!("expected an object or array at top level, found `{other}`"),
        )),
    }
}

pub fn encode_xml(data: &Payload) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
        .map_err(xml_write_error)?;
    writer.get_mut().push(b'\n');

    if data.is_empty() {
        writer
            .write_event(Event::Empty(BytesStart::new(XML_ROOT)))
            .map_err(xml_write_error)?;
    } else {
        writer
            .write_event(Event::Start(BytesStart::new(XML_ROOT)))
            .map_err(xml_write_error)?;
        for (key, value) in data {
            write_xml_element(&mut writer, key, value)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(XML_ROOT)))
            .map_err(xml_write_error)?;
    }
    writer.get_mut().push(b'\n');
    Ok(writer.into_inner())
}

fn write_xml_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: &Value,
) -> Result<(), EncodeError> {
    if !is_xml_name(name) {
        return Err(EncodeError::InvalidElementName(name.to_string()));
    }
    match value {
        Value::Array(items) => {
            for item in items {
                write_xml_element(writer, name, item)?;
            }
        }
        Value::Null => {
            writer
                .write_event(Event::Empty(BytesStart::new(name)))
                .map_err(xml_write_error)?;
        }
        Value::Object(map) if map.is_empty() => {
            writer
                .write_event(Event::Empty(BytesStart::new(name)))
                .map_err(xml_write_error)?;
        }
        Value::Object(map) => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(xml_write_error)?;
            for (child, item) in map {
                write_xml_element(writer, child, item)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_write_error)?;
        }
        scalar => {
            let text = match scalar {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(xml_write_error)?;
            writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(xml_write_error)?;
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_write_error)?;
        }
    }
    Ok(())
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn xml_write_error(err: impl std::fmt::Display) -> EncodeError {
    EncodeError::Serialize(err.to_string())
}

/// An element whose end tag has not been read yet.
struct XmlFrame {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl XmlFrame {
    fn open(start: &BytesStart<'_>) -> Result<Self, DecodeError> {
        let mut attributes = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| DecodeError::parse(DecoderKind::Xml, e))?;
            let value = attribute
                .unescape_value()
                .map_err(|e| DecodeError::parse(DecoderKind::Xml, e))?;
            attributes.insert(
                String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
                Value::String(value.into_owned()),
            );
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            children: Map::new(),
            text: String::new(),
        })
    }

    fn push_child(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }

    /// Text is trimmed once, after every piece between the child elements has
    /// been joined, so inner spacing of mixed content survives.
    fn into_value(self) -> (String, Value) {
        let text = self.text.trim();
        if self.attributes.is_empty() && self.children.is_empty() {
            return (self.name, Value::String(text.to_string()));
        }
        let mut map = Map::new();
        if !self.attributes.is_empty() {
            map.insert(XML_ATTRIBUTES_KEY.to_string(), Value::Object(self.attributes));
        }
        map.extend(self.children);
        if !text.is_empty() {
            map.insert(XML_TEXT_KEY.to_string(), Value::String(text.to_string()));
        }
        (self.name, Value::Object(map))
    }
}

/// Parse an XML document into `{root_tag: value}`.
pub fn decode_xml(body: &[u8]) -> Result<Payload, DecodeError> {
    let mut reader = Reader::from_reader(body);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlFrame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| DecodeError::parse(DecoderKind::Xml, e))?
        {
            Event::Start(start) => {
                ensure_single_root(&stack, &root)?;
                stack.push(XmlFrame::open(&start)?);
            }
            Event::Empty(start) => {
                ensure_single_root(&stack, &root)?;
                let frame = XmlFrame::open(&start)?;
                close_element(frame, &mut stack, &mut root);
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| {
                    DecodeError::parse(DecoderKind::Xml, "end tag without a matching start tag")
                })?;
                close_element(frame, &mut stack, &mut root);
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| DecodeError::parse(DecoderKind::Xml, e))?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                append_text(&mut stack, &String::from_utf8_lossy(&data))?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(DecodeError::parse(
            DecoderKind::Xml,
            format!("unexpected end of document inside <{}>", open.name),
        ));
    }
    let (name, value) = root
        .ok_or_else(|| DecodeError::parse(DecoderKind::Xml, "document has no root element"))?;
    let mut map = Map::new();
    map.insert(name, value);
    Ok(map)
}

fn ensure_single_root(
    stack: &[XmlFrame],
    root: &Option<(String, Value)>,
) -> Result<(), DecodeError> {
    if stack.is_empty() && root.is_some() {
        return Err(DecodeError::parse(DecoderKind::Xml, "multiple root elements"));
    }
    Ok(())
}

fn append_text(stack: &mut [XmlFrame], text: &str) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(frame) => {
            frame.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(DecodeError::parse(
            DecoderKind::Xml,
            "text content outside of the root element",
        )),
    }
}

fn close_element(frame: XmlFrame, stack: &mut [XmlFrame], root: &mut Option<(String, Value)>) {
    let (name, value) = frame.into_value();
    match stack.last_mut() {
        Some(parent) => parent.push_child(name, value),
        None => *root = Some((name, value)),
    }
}
