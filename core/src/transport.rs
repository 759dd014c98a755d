//! The network collaborator behind `Client`.
//!
//! # Design
//! `Transport` is the only seam between request composition and the network:
//! it takes a `PreparedRequest` and hands back status, headers and raw body
//! bytes. `UreqTransport` is the default engine. It configures a fresh agent
//! per request, so nothing is pooled or reused between calls, and it reports
//! every status code as data so the caller decides what a 404 means.

use std::collections::BTreeMap;
use std::io;
use std::time::Duration;

use bytes::Bytes;
use ureq::tls::TlsConfig;
use ureq::{Agent, RequestBuilder};

use crate::error::{TransportError, TransportErrorKind};
use crate::http::{HttpMethod, PreparedRequest, RawResponse, ResponseHeaders};

/// Per-request settings the transport applies on top of the request itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    /// `true` validates the peer certificate and host name, `false` skips both.
    pub verify_ssl: bool,
    /// 0 means no limit.
    pub connect_timeout_secs: u64,
    /// 0 means no limit.
    pub request_timeout_secs: u64,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            verify_ssl: true,
            connect_timeout_secs: 0,
            request_timeout_secs: 0,
        }
    }
}

/// Executes a prepared request and returns the raw result.
///
/// Implementations must report connection, DNS, TLS and timeout failures as
/// `TransportError` and must not retry.
pub trait Transport {
    fn execute(
        &self,
        request: &PreparedRequest,
        options: &TransportOptions,
    ) -> Result<RawResponse, TransportError>;
}

/// Blocking transport built on `ureq`.
///
/// Redirects are not followed: a 3xx comes back as the response, with its
/// `location` header captured. Response bodies are read without a size cap.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    fn agent(options: &TransportOptions) -> Agent {
        Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .timeout_connect(seconds(options.connect_timeout_secs))
            .timeout_global(seconds(options.request_timeout_secs))
            .tls_config(
                TlsConfig::builder()
                    .disable_verification(!options.verify_ssl)
                    .build(),
            )
            .build()
            .new_agent()
    }
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        request: &PreparedRequest,
        options: &TransportOptions,
    ) -> Result<RawResponse, TransportError> {
        let agent = Self::agent(options);
        let url = request.url.as_str();
        let body = request.body.as_deref().unwrap_or_default();

        let mut response = match request.method {
            HttpMethod::Get => with_headers(agent.get(url), &request.headers).call(),
            HttpMethod::Delete => with_headers(agent.delete(url), &request.headers).call(),
            HttpMethod::Post => with_headers(agent.post(url), &request.headers).send(body),
            HttpMethod::Put => with_headers(agent.put(url), &request.headers).send(body),
            HttpMethod::Patch => with_headers(agent.patch(url), &request.headers).send(body),
        }?;

        let mut headers = ResponseHeaders::new();
        headers.capture(&format!("{:?} {}", response.version(), response.status()));
        for (name, value) in response.headers() {
            headers.capture(&format!(
                "{name}: {}",
                String::from_utf8_lossy(value.as_bytes())
            ));
        }
        let content_type = response
            .headers()
            .get(ureq::http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        Ok(RawResponse {
            status,
            body: Bytes::from(body),
            headers,
            content_type,
        })
    }
}

fn with_headers<B>(
    mut builder: RequestBuilder<B>,
    headers: &BTreeMap<String, String>,
) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        let kind = match &err {
            ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
            ureq::Error::HostNotFound => TransportErrorKind::Dns,
            ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
            ureq::Error::Tls(_) => TransportErrorKind::Tls,
            ureq::Error::BadUri(_) | ureq::Error::Http(_) => TransportErrorKind::InvalidRequest,
            ureq::Error::Io(io_err) => match io_err.kind() {
                io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => {
                    TransportErrorKind::Connect
                }
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportErrorKind::Timeout,
                _ => TransportErrorKind::Io,
            },
            _ => TransportErrorKind::Other,
        };
        TransportError::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_means_unbounded() {
        assert_eq!(seconds(0), None);
        assert_eq!(seconds(3), Some(Duration::from_secs(3)));
    }

    #[test]
    fn default_options_verify_tls() {
        let options = TransportOptions::default();
        assert!(options.verify_ssl);
        assert_eq!(options.connect_timeout_secs, 0);
        assert_eq!(options.request_timeout_secs, 0);
    }

    #[test]
    fn ureq_errors_are_classified() {
        let err = TransportError::from(ureq::Error::HostNotFound);
        assert_eq!(err.kind, TransportErrorKind::Dns);

        let err = TransportError::from(ureq::Error::ConnectionFailed);
        assert_eq!(err.kind, TransportErrorKind::Connect);

        let err = TransportError::from(ureq::Error::BadUri("nope".to_string()));
        assert_eq!(err.kind, TransportErrorKind::InvalidRequest);

        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::from(ureq::Error::Io(refused));
        assert_eq!(err.kind, TransportErrorKind::Connect);
    }
}
