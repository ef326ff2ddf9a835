//! HTTP transport types and the blocking transport used by default.
//!
//! # Design
//! Requests and responses are plain data. `Connection` builds an
//! `HttpRequest` and classifies an `HttpResponse`; the only code that touches
//! the network is a `Transport` implementation. `UreqTransport` opens a fresh
//! agent per call, so nothing is pooled or reused between requests.
//!
//! All fields use owned types (`String`, `Vec`) so requests can be recorded
//! and compared in tests without lifetime concerns.

use std::fmt;

use ureq::typestate::{WithBody, WithoutBody};
use ureq::RequestBuilder;

use crate::error::{ApiError, Result};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the full request target: base path, resource path, the `.json`
/// suffix and, when any parameter exists, the `?`-prefixed query string.
/// `body` is `None` when the request carries an empty payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The query string without its leading `?`, if any.
    pub fn query(&self) -> Option<&str> {
        self.path.split_once('?').map(|(_, query)| query)
    }
}

/// An HTTP response described as plain data.
///
/// `body` holds the raw bytes; decoding is left to classification so an
/// undecodable payload still keeps its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Executes one request against `host` and returns the raw response.
///
/// Implementations must hand back 4xx/5xx responses as data rather than
/// errors; status interpretation belongs to `Connection`.
pub trait Transport: Send + Sync {
    fn execute(&self, host: &str, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Plain `http://` transport over a fresh ureq agent per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn execute(&self, host: &str, request: &HttpRequest) -> Result<HttpResponse> {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();

        let url = format!("http://{host}{}", request.path);
        let body = request.body.as_deref().map(str::as_bytes);
        let headers = &request.headers;

        let result = match request.method {
            HttpMethod::Get => send_without_body(with_headers(agent.get(&url), headers), body),
            HttpMethod::Delete => {
                send_without_body(with_headers(agent.delete(&url), headers), body)
            }
            HttpMethod::Post => send_with_body(with_headers(agent.post(&url), headers), body),
            HttpMethod::Put => send_with_body(with_headers(agent.put(&url), headers), body),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        // No size cap: large listings are still valid responses.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

// GET and DELETE only carry a body when the caller supplied one (search
// queries travel as a JSON body on GET).
fn send_without_body(
    builder: RequestBuilder<WithoutBody>,
    body: Option<&[u8]>,
) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.force_send_body().send(bytes),
        None => builder.call(),
    }
}

fn send_with_body(
    builder: RequestBuilder<WithBody>,
    body: Option<&[u8]>,
) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.send(bytes),
        None => builder.send_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: "/api/v1/engines.json?auth_token=abc&page=2".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    #[test]
    fn header_lookup_ignores_case() {
        assert_eq!(request().header("content-type"), Some("application/json"));
        assert_eq!(request().header("Authorization"), None);
    }

    #[test]
    fn query_splits_on_question_mark() {
        assert_eq!(request().query(), Some("auth_token=abc&page=2"));
        let bare = HttpRequest {
            path: "/api/v1/engines.json".to_string(),
            ..request()
        };
        assert_eq!(bare.query(), None);
    }

    #[test]
    fn method_renders_uppercase() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
    }
}
