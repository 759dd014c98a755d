//! Vocabulary types: authorization schemes and MIME types.
//!
//! # Design
//! The client accepts these as enums rather than free-form strings so a typo
//! in a content type is a compile error. Each type maps to and from the
//! string it puts on the wire.

use std::fmt;
use std::str::FromStr;

/// Scheme prefix for the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationType {
    Basic,
    Bearer,
    Digest,
    Hmac,
    /// The credential is sent bare, without a scheme prefix.
    #[default]
    None,
}

impl AuthorizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationType::Basic => "Basic",
            AuthorizationType::Bearer => "Bearer",
            AuthorizationType::Digest => "Digest",
            AuthorizationType::Hmac => "HMAC",
            AuthorizationType::None => "",
        }
    }

    /// Render the header value for `credential` under this scheme.
    pub fn header_value(&self, credential: &str) -> String {
        match self {
            AuthorizationType::None => credential.to_string(),
            scheme => format!("{} {credential}", scheme.as_str()),
        }
    }
}

impl FromStr for AuthorizationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(AuthorizationType::None),
            "Basic" => Ok(AuthorizationType::Basic),
            "Bearer" => Ok(AuthorizationType::Bearer),
            "Digest" => Ok(AuthorizationType::Digest),
            "HMAC" => Ok(AuthorizationType::Hmac),
            other => Err(format!("unknown authorization type: {other}")),
        }
    }
}

/// Content type of a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    Json,
    #[default]
    FormEncoded,
    Xml,
    XmlText,
    Html,
    Text,
}

impl ContentType {
    /// Canonical MIME string sent in the `Content-Type` header.
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::FormEncoded => "application/x-www-form-urlencoded",
            ContentType::Xml => "application/xml",
            ContentType::XmlText => "text/xml",
            ContentType::Html => "text/html",
            ContentType::Text => "text/plain",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Content type of a response body, used to pick a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Json,
    Xml,
    XmlText,
    Text,
    Html,
}

impl ResponseType {
    pub fn mime(&self) -> &'static str {
        match self {
            ResponseType::Json => "application/json",
            ResponseType::Xml => "application/xml",
            ResponseType::XmlText => "text/xml",
            ResponseType::Text => "text/plain",
            ResponseType::Html => "text/html",
        }
    }

    /// Match a bare MIME type (no parameters). Comparison ignores ASCII case
    /// and surrounding whitespace.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim();
        [
            ResponseType::Json,
            ResponseType::Xml,
            ResponseType::XmlText,
            ResponseType::Text,
            ResponseType::Html,
        ]
        .into_iter()
        .find(|candidate| candidate.mime().eq_ignore_ascii_case(mime))
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}
