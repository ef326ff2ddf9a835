//! Error types for the Swiftype API client.
//!
//! # Design
//! A small closed set: a 401 (or no usable credentials) maps to
//! `AuthorizationRequired`, every other non-2xx status lands in `Http` with
//! the raw response text, and a 2xx whose body is not JSON is
//! `MalformedResponse`. `Serialization` and `Transport` cover failures that
//! happen before an HTTP status exists.

use thiserror::Error;

/// Message carried by every authorization failure, whatever the server said.
pub const AUTHORIZATION_REQUIRED: &str = "Authorization required.";

/// Errors returned by `Client` and `Connection` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No credentials were configured, or the server answered 401.
    #[error("HTTP 401: Authorization required.")]
    AuthorizationRequired,

    /// The server returned a non-2xx status other than 401.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A 2xx response carried a body that is not valid JSON.
    #[error("the JSON response could not be parsed: {0}")]
    MalformedResponse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request never produced an HTTP response.
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// HTTP status associated with the failure, if the server produced one
    /// or the failure is reported as one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthorizationRequired => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
