//! Request construction, dispatch and response classification.
//!
//! # Design
//! `Connection` owns the configuration, the credentials and a transport.
//! `build_request` and `parse_response` are pure, so every wire-level
//! property can be checked without a network; `request` glues them to the
//! transport. Nothing is mutated after construction, which makes a
//! connection safe to share across threads.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::Auth;
use crate::config::{ClientConfig, Credentials};
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::params::Params;
use crate::types::ApiResponse;

#[derive(Clone)]
pub struct Connection {
    config: ClientConfig,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
}

impl Connection {
    pub fn new(config: ClientConfig, credentials: Credentials) -> Self {
        Self::with_transport(config, credentials, Arc::new(UreqTransport))
    }

    pub fn with_transport(
        config: ClientConfig,
        credentials: Credentials,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            credentials,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolves authentication and renders the full request.
    ///
    /// Fails with `AuthorizationRequired` when no usable credentials are
    /// configured.
    pub fn build_request(
        &self,
        method: HttpMethod,
        resource_path: &str,
        mut params: Params,
        body: Option<&Value>,
    ) -> Result<HttpRequest> {
        let auth = Auth::resolve(&self.credentials)?;

        let mut headers = vec![
            ("User-Agent".to_string(), self.config.user_agent.clone()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        auth.apply(&mut headers, &mut params);

        let mut path = format!("{}{resource_path}.json", self.config.base_path);
        if !params.is_empty() {
            path.push('?');
            path.push_str(&params.to_query_string());
        }

        debug!(
            method = %method,
            resource = resource_path,
            auth = auth.scheme(),
            "built request"
        );

        Ok(HttpRequest {
            method,
            path,
            headers,
            body: encode_body(body)?,
        })
    }

    /// Classifies a raw response into an envelope or a typed failure.
    pub fn parse_response(&self, response: HttpResponse) -> Result<ApiResponse> {
        classify_response(response)
    }

    pub fn request(
        &self,
        method: HttpMethod,
        resource_path: &str,
        params: Params,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let request = self.build_request(method, resource_path, params, body)?;
        let response = self.transport.execute(&self.config.host, &request)?;
        debug!(
            method = %method,
            resource = resource_path,
            status = response.status,
            "received response"
        );
        self.parse_response(response)
    }

    pub fn get(&self, resource_path: &str, params: Params, body: Option<&Value>) -> Result<ApiResponse> {
        self.request(HttpMethod::Get, resource_path, params, body)
    }

    pub fn post(&self, resource_path: &str, params: Params, body: Option<&Value>) -> Result<ApiResponse> {
        self.request(HttpMethod::Post, resource_path, params, body)
    }

    pub fn put(&self, resource_path: &str, params: Params, body: Option<&Value>) -> Result<ApiResponse> {
        self.request(HttpMethod::Put, resource_path, params, body)
    }

    pub fn delete(&self, resource_path: &str, params: Params, body: Option<&Value>) -> Result<ApiResponse> {
        self.request(HttpMethod::Delete, resource_path, params, body)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// JSON text for a payload; null, `{}` and `[]` count as no payload.
fn encode_body(body: Option<&Value>) -> Result<Option<String>> {
    let Some(value) = body else {
        return Ok(None);
    };
    let is_empty = match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if is_empty {
        return Ok(None);
    }
    serde_json::to_string(value)
        .map(Some)
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

fn classify_response(response: HttpResponse) -> Result<ApiResponse> {
    match response.status {
        200..=299 => {
            if response.body.is_empty() {
                return Ok(ApiResponse {
                    status: response.status,
                    body: None,
                });
            }
            let text = std::str::from_utf8(&response.body).map_err(|e| {
                warn!(status = response.status, error = %e, "response is not UTF-8");
                ApiError::MalformedResponse(format!(
                    "{e}\n{}",
                    String::from_utf8_lossy(&response.body)
                ))
            })?;
            let body = serde_json::from_str(text).map_err(|e| {
                warn!(status = response.status, error = %e, "malformed JSON response");
                ApiError::MalformedResponse(format!("{e}\n{text}"))
            })?;
            Ok(ApiResponse {
                status: response.status,
                body: Some(body),
            })
        }
        401 => {
            warn!("server rejected credentials");
            Err(ApiError::AuthorizationRequired)
        }
        status => Err(ApiError::Http {
            status,
            message: String::from_utf8_lossy(&response.body).into_owned(),
        }),
    }
}
