//! Configurable HTTP client.
//!
//! # Design
//! `Client` owns its `ClientConfig`, its `Transport` and the headers captured
//! from the last response. Every verb call runs the same pipeline:
//!
//! 1. drop the `Content-Type` header left by the previous call and forget
//!    the previous response headers; all other configured headers stay;
//! 2. build the URL from base URL, endpoint, path and query parameters;
//! 3. for POST/PUT/PATCH, encode the body and set `Content-Type`;
//! 4. hand the prepared request to the transport;
//! 5. wrap the result in a `ResponsePayload`.
//!
//! Verb methods take `&mut self`. One client serves one caller at a time;
//! use one client per thread (or an external lock) for concurrent work.

use crate::codec::{self, Payload};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{HttpMethod, PreparedRequest, ResponseHeaders};
use crate::response::ResponsePayload;
use crate::transport::{Transport, UreqTransport};
use crate::types::{AuthorizationType, ContentType};

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";

/// HTTP client bound to one configuration and one transport.
#[derive(Debug)]
pub struct Client<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
    response_headers: ResponseHeaders,
}

impl Client<UreqTransport> {
    /// A client with the default configuration: no base URL, no endpoint,
    /// no headers and TLS verification on.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport)
    }
}

impl Default for Client<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            response_headers: ResponseHeaders::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Headers captured from the most recent response.
    pub fn response_headers(&self) -> &ResponseHeaders {
        &self.response_headers
    }

    pub fn set_base_url(&mut self, url: &str) -> &mut Self {
        self.config.base_url = url.to_string();
        self
    }

    pub fn set_endpoint(&mut self, endpoint: &str) -> &mut Self {
        self.config.endpoint = endpoint.to_string();
        self
    }

    /// Turning verification off skips certificate and host name checks.
    /// Only meant for development against self-signed servers.
    pub fn set_verify_ssl(&mut self, verify: bool) -> &mut Self {
        self.config.verify_ssl = verify;
        self
    }

    pub fn set_authorization(&mut self, kind: AuthorizationType, credential: &str) -> &mut Self {
        self.config
            .headers
            .insert(AUTHORIZATION.to_string(), kind.header_value(credential));
        self
    }

    /// Decode responses as `mime` regardless of what the server declares.
    /// An empty string restores the server's content type.
    pub fn set_response_type(&mut self, mime: &str) -> &mut Self {
        self.config.forced_response_type = Some(mime.to_string());
        self
    }

    pub fn set_request_timeout(&mut self, secs: u64) -> &mut Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn set_connect_timeout(&mut self, secs: u64) -> &mut Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    pub fn add_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.config
            .headers
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Result<&str, ClientError> {
        self.config
            .headers
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ClientError::HeaderNotFound(name.to_string()))
    }

    pub fn delete_header(&mut self, name: &str) -> &mut Self {
        self.config.headers.remove(name);
        self
    }

    pub fn get(&mut self, path: &str, parameters: &Payload) -> Result<ResponsePayload, ClientError> {
        self.send(HttpMethod::Get, path, None, parameters)
    }

    pub fn post(
        &mut self,
        path: &str,
        body: &Payload,
        content_type: ContentType,
        parameters: &Payload,
    ) -> Result<ResponsePayload, ClientError> {
        self.send(HttpMethod::Post, path, Some((body, content_type)), parameters)
    }

    pub fn put(
        &mut self,
        path: &str,
        body: &Payload,
        content_type: ContentType,
        parameters: &Payload,
    ) -> Result<ResponsePayload, ClientError> {
        self.send(HttpMethod::Put, path, Some((body, content_type)), parameters)
    }

    pub fn patch(
        &mut self,
        path: &str,
        body: &Payload,
        content_type: ContentType,
        parameters: &Payload,
    ) -> Result<ResponsePayload, ClientError> {
        self.send(HttpMethod::Patch, path, Some((body, content_type)), parameters)
    }

    pub fn delete(&mut self, path: &str, parameters: &Payload) -> Result<ResponsePayload, ClientError> {
        self.send(HttpMethod::Delete, path, None, parameters)
    }

    /// Reset per-call state and build the request for one call.
    ///
    /// The `Content-Type` header set here stays in the configuration until
    /// the next call resets it.
    pub fn prepare(
        &mut self,
        method: HttpMethod,
        path: &str,
        body: Option<(&Payload, ContentType)>,
        parameters: &Payload,
    ) -> Result<PreparedRequest, ClientError> {
        self.config.headers.remove(CONTENT_TYPE);
        self.response_headers.clear();
        // Checked before Content-Type goes in, so a rejected call leaves none behind.
        self.config.validate_headers(method)?;

        let url = self.config.build_url(path, parameters);
        let body = match body {
            Some((data, content_type)) => {
                let encoded = codec::encode(content_type, data)?;
                self.config
                    .headers
                    .insert(CONTENT_TYPE.to_string(), content_type.mime().to_string());
                Some(encoded)
            }
            None => None,
        };

        Ok(PreparedRequest {
            method,
            url,
            headers: self.config.headers.clone(),
            body,
        })
    }

    fn send(
        &mut self,
        method: HttpMethod,
        path: &str,
        body: Option<(&Payload, ContentType)>,
        parameters: &Payload,
    ) -> Result<ResponsePayload, ClientError> {
        let request = self.prepare(method, path, body, parameters)?;
        log::debug!("{} {}", request.method, request.url);

        let raw = self
            .transport
            .execute(&request, &self.config.transport_options())?;
        self.response_headers = raw.headers.clone();

        let payload = ResponsePayload::new(raw, self.config.forced_response_type());
        log::debug!(
            "{} {} -> {} {}",
            request.method,
            request.url,
            payload.status(),
            payload.content_type()
        );
        Ok(payload)
    }
}
