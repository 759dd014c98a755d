//! Configurable blocking HTTP client with content negotiation.
//!
//! # Overview
//! A `Client` holds a base URL, an endpoint, headers and transport settings.
//! Each verb call builds a fresh `PreparedRequest` (URL, headers, encoded
//! body), runs it through a `Transport`, and returns a `ResponsePayload`
//! whose body can be decoded according to its content type.
//!
//! # Design
//! - Request bodies are `serde_json` maps encoded as JSON, form data or XML
//!   (`codec`).
//! - The network is behind the `Transport` trait; `UreqTransport` is the
//!   default and any engine returning status, headers and body bytes fits.
//! - Response decoding is lazy: `ResponsePayload::decode` only picks a
//!   `Decoder`, and each view parses the body when asked.
//! - Every failure is a typed error (`ClientError` and friends); nothing
//!   returns a sentinel in place of an error.

pub mod client;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;
pub mod types;

pub use client::Client;
pub use codec::Payload;
pub use config::ClientConfig;
pub use decoder::{Decode, Decoder};
pub use error::{
    ClientError, DecodeError, DecoderKind, EncodeError, Representation, TransportError,
    TransportErrorKind,
};
pub use http::{HttpMethod, PreparedRequest, RawResponse, ResponseHeaders};
pub use response::ResponsePayload;
pub use transport::{Transport, TransportOptions, UreqTransport};
pub use types::{AuthorizationType, ContentType, ResponseType};
