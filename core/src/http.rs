//! HTTP request and response types exchanged with the transport.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The client
//! builds a `PreparedRequest`, hands it to a `Transport`, and gets a
//! `RawResponse` back. Keeping them as owned values means a request can be
//! inspected in tests without any network involved.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully specified HTTP request, built fresh for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Bytes>,
}

/// Response headers captured line by line.
///
/// Lines of the form `name: value` land in `fields`, with a later header of
/// the same name replacing an earlier one. Non-empty lines without a colon,
/// such as the status line `HTTP/1.1 200 OK`, are kept in `lines` in arrival
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    fields: BTreeMap<String, String>,
    lines: Vec<String>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one raw header line.
    pub fn capture(&mut self, raw: &str) {
        let line = collapse_whitespace(raw);
        if let Some((name, value)) = line.split_once(':') {
            log::trace!("captured header {name}");
            self.fields
                .insert(name.to_string(), value.trim_start().to_string());
        } else if !line.is_empty() {
            self.lines.push(line);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Case-insensitive lookup, for transports that normalize header names.
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Header lines that had no `name: value` shape.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The first captured status line, if any.
    pub fn status_line(&self) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| line.starts_with("HTTP/"))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.lines.clear();
    }
}

/// Trim the line and replace every run of two or more whitespace characters
/// with a single space. Single whitespace characters are left as they are.
fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.trim().chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() && chars.peek().is_some_and(|next| next.is_whitespace()) {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

/// What a transport returns after executing a `PreparedRequest`.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
    pub headers: ResponseHeaders,
    /// The server's `Content-Type` header, parameters included.
    pub content_type: Option<String>,
}
