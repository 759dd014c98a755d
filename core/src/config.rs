//! Client configuration.
//!
//! # Design
//! `ClientConfig` is plain data owned by one `Client`. It derives serde so a
//! client can be set up from a JSON document; every field has a default, so
//! a partial document is enough. Headers live in a `BTreeMap` so the request
//! always lists them in the same order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{self, Payload};
use crate::error::ClientError;
use crate::http::HttpMethod;
use crate::transport::TransportOptions;

/// Configuration shared by every request a `Client` sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub endpoint: String,
    pub headers: BTreeMap<String, String>,
    pub verify_ssl: bool,
    /// Overrides the server's `Content-Type` when picking a decoder.
    pub forced_response_type: Option<String>,
    /// Total request budget in seconds; 0 means no limit.
    pub request_timeout_secs: u64,
    /// Connection establishment budget in seconds; 0 means no limit.
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            endpoint: String::new(),
            headers: BTreeMap::new(),
            verify_ssl: true,
            forced_response_type: None,
            request_timeout_secs: 0,
            connect_timeout_secs: 0,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str, endpoint: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            endpoint: endpoint.to_string(),
            ..Self::default()
        }
    }

    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        serde_json::from_str(json).map_err(|e| ClientError::Configuration(e.to_string()))
    }

    /// Concatenate base URL, endpoint and `path`, appending the encoded
    /// query string only when `parameters` is non-empty.
    pub fn build_url(&self, path: &str, parameters: &Payload) -> String {
        let url = format!("{}{}{path}", self.base_url, self.endpoint);
        if parameters.is_empty() {
            url
        } else {
            format!("{url}?{}", codec::encode_form(parameters))
        }
    }

    /// The forced response type, if set to a non-empty string.
    pub fn forced_response_type(&self) -> Option<&str> {
        self.forced_response_type
            .as_deref()
            .filter(|forced| !forced.is_empty())
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            verify_ssl: self.verify_ssl,
            connect_timeout_secs: self.connect_timeout_secs,
            request_timeout_secs: self.request_timeout_secs,
        }
    }

    /// Reject header names and values that cannot appear on the wire.
    pub fn validate_headers(&self, method: HttpMethod) -> Result<(), ClientError> {
        for (name, value) in &self.headers {
            if !is_header_name(name) {
                return Err(ClientError::Configuration(format!(
                    "{method}: invalid header name `{name}`"
                )));
            }
            if value.contains(['\r', '\n', '\0']) {
                return Err(ClientError::Configuration(format!(
                    "{method}: header `{name}` has a line break in its value"
                )));
            }
        }
        Ok(())
    }
}

/// RFC 9110 token characters.
fn is_header_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}
