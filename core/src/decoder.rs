//! Content-type aware views of a response body.
//!
//! # Design
//! A `Decoder` is picked from the effective content type and offers three
//! views of the body through the `Decode` trait: a generic
//! `serde_json::Value`, an insertion-ordered mapping, and the raw text. JSON
//! and XML support all three. Text and HTML only support the raw text; the
//! structured views return `DecodeError::UnsupportedOperation`.
//!
//! Nothing is cached. Each structured call parses the body again, and
//! `as_string` always returns the body exactly as received.

use bytes::Bytes;
use serde_json::Value;

use crate::codec::{self, Payload};
use crate::error::{DecodeError, DecoderKind, Representation};
use crate::types::ResponseType;

/// The three views every decoder kind answers for.
pub trait Decode {
    fn kind(&self) -> DecoderKind;

    /// The body as a generic structured value.
    fn as_object(&self) -> Result<Value, DecodeError>;

    /// The body as an insertion-ordered mapping.
    fn as_map(&self) -> Result<Payload, DecodeError>;

    /// The body text, unmodified.
    fn as_string(&self) -> Result<String, DecodeError>;
}

fn raw_text(body: &Bytes) -> String {
    String::from_utf8_lossy(body).into_owned()
}

#[derive(Debug, Clone)]
pub struct JsonDecoder {
    body: Bytes,
}

impl JsonDecoder {
    pub fn new(body: Bytes) -> Self {
        Self { body }
    }
}

impl Decode for JsonDecoder {
    fn kind(&self) -> DecoderKind {
        DecoderKind::Json
    }

    fn as_object(&self) -> Result<Value, DecodeError> {
        codec::decode_json(&self.body)
    }

    fn as_map(&self) -> Result<Payload, DecodeError> {
        codec::decode_json_map(&self.body)
    }

    fn as_string(&self) -> Result<String, DecodeError> {
        Ok(raw_text(&self.body))
    }
}

#[derive(Debug, Clone)]
pub struct XmlDecoder {
    body: Bytes,
}

impl XmlDecoder {
    pub fn new(body: Bytes) -> Self {
        Self { body }
    }
}

impl Decode for XmlDecoder {
    fn kind(&self) -> DecoderKind {
        DecoderKind::Xml
    }

    fn as_object(&self) -> Result<Value, DecodeError> {
        codec::decode_xml(&self.body).map(Value::Object)
    }

    fn as_map(&self) -> Result<Payload, DecodeError> {
        codec::decode_xml(&self.body)
    }

    fn as_string(&self) -> Result<String, DecodeError> {
        Ok(raw_text(&self.body))
    }
}

/// Decoder for `text/plain` and `text/html`.
#[derive(Debug, Clone)]
pub struct TextDecoder {
    body: Bytes,
}

impl TextDecoder {
    pub fn new(body: Bytes) -> Self {
        Self { body }
    }
}

impl Decode for TextDecoder {
    fn kind(&self) -> DecoderKind {
        DecoderKind::Text
    }

    fn as_object(&self) -> Result<Value, DecodeError> {
        Err(DecodeError::UnsupportedOperation {
            kind: DecoderKind::Text,
            operation: Representation::GenericObject,
        })
    }

    fn as_map(&self) -> Result<Payload, DecodeError> {
        Err(DecodeError::UnsupportedOperation {
            kind: DecoderKind::Text,
            operation: Representation::OrderedMapping,
        })
    }

    fn as_string(&self) -> Result<String, DecodeError> {
        Ok(raw_text(&self.body))
    }
}

/// A decoder for one of the supported content kinds.
#[derive(Debug, Clone)]
pub enum Decoder {
    Json(JsonDecoder),
    Xml(XmlDecoder),
    Text(TextDecoder),
}

impl Decoder {
    /// Pick the decoder for `content_type`. Parameters after `;` are ignored.
    pub fn for_content_type(content_type: &str, body: Bytes) -> Result<Self, DecodeError> {
        let essence = content_type.split(';').next().unwrap_or_default();
        match ResponseType::from_mime(essence) {
            Some(ResponseType::Json) => Ok(Decoder::Json(JsonDecoder::new(body))),
            Some(ResponseType::Xml | ResponseType::XmlText) => {
                Ok(Decoder::Xml(XmlDecoder::new(body)))
            }
            Some(ResponseType::Text | ResponseType::Html) => {
                Ok(Decoder::Text(TextDecoder::new(body)))
            }
            None => Err(DecodeError::UnsupportedContentType(content_type.to_string())),
        }
    }

    fn inner(&self) -> &dyn Decode {
        match self {
            Decoder::Json(decoder) => decoder,
            Decoder::Xml(decoder) => decoder,
            Decoder::Text(decoder) => decoder,
        }
    }
}

impl Decode for Decoder {
    fn kind(&self) -> DecoderKind {
        self.inner().kind()
    }

    fn as_object(&self) -> Result<Value, DecodeError> {
        self.inner().as_object()
    }

    fn as_map(&self) -> Result<Payload, DecodeError> {
        self.inner().as_map()
    }

    fn as_string(&self) -> Result<String, DecodeError> {
        self.inner().as_string()
    }
}
