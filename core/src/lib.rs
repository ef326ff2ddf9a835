//! Synchronous client for the Swiftype search API.
//!
//! # Overview
//! `Client` exposes one method per remote resource (engines, document types,
//! documents, search and suggest, analytics, crawler domains, platform users)
//! and returns an `ApiResponse` envelope or a typed `ApiError`. Single
//! sign-on URLs are computed locally.
//!
//! # Design
//! - `Connection` resolves authentication, renders the request and
//!   classifies the response; both halves are pure and tested without I/O.
//! - The network is reached only through the `Transport` trait. The default
//!   `UreqTransport` opens a fresh connection per call.
//! - Host, base path, user agent and SSO host live in `ClientConfig`, not in
//!   globals, so differently configured clients coexist.
//! - The SSO clock is the `Clock` trait so timestamps can be pinned in tests.

pub mod auth;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod params;
pub mod paths;
pub mod sso;
pub mod types;

pub use auth::Auth;
pub use client::{Client, ClientBuilder, SearchOptions};
pub use config::{ClientConfig, Credentials};
pub use connection::Connection;
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use params::{ParamValue, Params};
pub use sso::{Clock, FixedClock, SystemClock};
pub use types::ApiResponse;
