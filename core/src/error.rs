//! Error types for the HTTP client.
//!
//! # Design
//! Each stage of a request has its own error type so callers can match on
//! the failure that actually happened: `EncodeError` while building the
//! body, `TransportError` while talking to the server, `DecodeError` while
//! reading the response. `ClientError` wraps all of them for the verb
//! methods. Nothing here is logged or retried; every failure is returned.

use std::fmt;

use thiserror::Error;

use crate::types::ContentType;

/// Top-level error returned by `Client` operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client configuration cannot produce a valid request.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A header lookup found no entry with that exact name.
    #[error("header not found: {0}")]
    HeaderNotFound(String),
}

/// Classification of transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The connection was refused or could not be established.
    Connect,
    /// The host name could not be resolved.
    Dns,
    /// Certificate or handshake failure.
    Tls,
    /// The connect or request timeout elapsed.
    Timeout,
    /// The transport rejected the request before sending it (bad URL, bad header).
    InvalidRequest,
    Io,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Connect => "connection failed",
            TransportErrorKind::Dns => "dns lookup failed",
            TransportErrorKind::Tls => "tls failure",
            TransportErrorKind::Timeout => "timed out",
            TransportErrorKind::InvalidRequest => "invalid request",
            TransportErrorKind::Io => "i/o error",
            TransportErrorKind::Other => "transport failure",
        };
        f.write_str(name)
    }
}

/// A failure reported by the `Transport` collaborator.
#[derive(Debug, Clone, Error)]
#[error("transport error ({kind}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Errors raised while encoding a request body.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The content type has no body encoder (plain text and HTML).
    #[error("cannot encode a request body as {0}")]
    UnsupportedContentType(ContentType),

    /// A mapping key cannot be used as an XML element name.
    #[error("`{0}` is not a valid XML element name")]
    InvalidElementName(String),

    #[error("serialization failed: {0}")]
    Serialize(String),
}

/// The content kinds a response body can be decoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderKind {
    Json,
    Xml,
    Text,
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderKind::Json => f.write_str("json"),
            DecoderKind::Xml => f.write_str("xml"),
            DecoderKind::Text => f.write_str("text"),
        }
    }
}

/// The representations a decoder can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    GenericObject,
    OrderedMapping,
    RawString,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::GenericObject => f.write_str("as_object()"),
            Representation::OrderedMapping => f.write_str("as_map()"),
            Representation::RawString => f.write_str("as_string()"),
        }
    }
}

/// Errors raised while decoding a response body.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not well-formed for its content kind.
    #[error("failed to parse {kind} body: {message}")]
    Parse { kind: DecoderKind, message: String },

    /// The content kind does not support the requested representation.
    #[error("{operation} is not applicable to {kind} content")]
    UnsupportedOperation {
        kind: DecoderKind,
        operation: Representation,
    },

    /// No decoder matches the effective content type.
    #[error("no decoder for content type `{0}`")]
    UnsupportedContentType(String),
}

impl DecodeError {
    pub(crate) fn parse(kind: DecoderKind, message: impl fmt::Display) -> Self {
        DecodeError::Parse {
            kind,
            message: message.to_string(),
        }
    }
}
