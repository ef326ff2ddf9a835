//! Shared test transport that records requests instead of sending them.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use swiftype_core::{Client, ClientBuilder, HttpRequest, HttpResponse, Result, Transport};

/// Records every request and answers each one with the same canned response.
pub struct RecordingTransport {
    requests: Mutex<Vec<(String, HttpRequest)>>,
    response: HttpResponse,
}

impl RecordingTransport {
    pub fn new(status: u16, body: impl AsRef<[u8]>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            response: HttpResponse {
                status,
                headers: Vec::new(),
                body: body.as_ref().to_vec(),
            },
        })
    }

    pub fn requests(&self) -> Vec<(String, HttpRequest)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|(_, request)| request.clone())
            .expect("no request recorded")
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, host: &str, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((host.to_string(), request.clone()));
        Ok(self.response.clone())
    }
}

/// Builder already wired to `transport` and a local host.
pub fn builder(transport: &Arc<RecordingTransport>) -> ClientBuilder {
    Client::builder()
        .host("localhost:3000")
        .transport(transport.clone())
}

/// `key=value` pairs of a request's query string, in order.
pub fn query_pairs(request: &HttpRequest) -> Vec<(String, String)> {
    request
        .query()
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}
