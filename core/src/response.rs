//! The result of one executed request.

use bytes::Bytes;

use crate::decoder::Decoder;
use crate::error::{ClientError, DecodeError};
use crate::http::{RawResponse, ResponseHeaders};

/// Status, headers and body of a response, plus the content type that
/// decides how the body is decoded.
#[derive(Debug, Clone)]
pub struct ResponsePayload {
    status: u16,
    body: Bytes,
    headers: ResponseHeaders,
    content_type: String,
}

impl ResponsePayload {
    /// Wrap a transport result. The effective content type is `forced` when
    /// given, otherwise the declared `Content-Type` without its parameters.
    pub fn new(raw: RawResponse, forced: Option<&str>) -> Self {
        let content_type = match forced {
            Some(forced) => forced.to_string(),
            None => raw
                .content_type
                .as_deref()
                .map(mime_essence)
                .unwrap_or_default()
                .to_string(),
        };
        Self {
            status: raw.status,
            body: raw.body,
            headers: raw.headers,
            content_type,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    /// The effective content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn header(&self, name: &str) -> Result<&str, ClientError> {
        self.headers
            .get(name)
            .ok_or_else(|| ClientError::HeaderNotFound(name.to_string()))
    }

    /// Select a decoder for the effective content type.
    pub fn decode(&self) -> Result<Decoder, DecodeError> {
        Decoder::for_content_type(&self.content_type, self.body.clone())
    }
}

fn mime_essence(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
}
