//! Client configuration and credentials.
//!
//! Host, base path, user agent and SSO host are ordinary values handed to
//! each client, so clients pointed at different hosts can coexist.

use std::fmt;

pub const DEFAULT_API_HOST: &str = "api.swiftype.com";
pub const DEFAULT_API_BASE_PATH: &str = "/api/v1/";
pub const DEFAULT_SSO_HOST: &str = "swiftype.com";
pub const DEFAULT_USER_AGENT: &str = concat!("swiftype-rust/", env!("CARGO_PKG_VERSION"));

/// Where and how a client talks to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host[:port]` the plain HTTP connection is opened against.
    pub host: String,
    /// Prefix joined in front of every resource path, e.g. `/api/v1/`.
    pub base_path: String,
    pub user_agent: String,
    /// Host used when building single-sign-on URLs.
    pub sso_host: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_API_HOST.to_string(),
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sso_host: DEFAULT_SSO_HOST.to_string(),
        }
    }
}

/// The credential set a connection authenticates with.
///
/// Any combination may be stored, including none at all. Which one is used
/// is decided per request (see `Auth::resolve`), so an empty set only fails
/// once a request is attempted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
}

impl Credentials {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    pub fn api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn access_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..Self::default()
        }
    }

    /// Reads `SWIFTYPE_USERNAME`, `SWIFTYPE_PASSWORD`, `SWIFTYPE_API_KEY` and
    /// `SWIFTYPE_ACCESS_TOKEN`. Unset or empty variables are left out.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());
        Self {
            username: read("SWIFTYPE_USERNAME"),
            password: read("SWIFTYPE_PASSWORD"),
            api_key: read("SWIFTYPE_API_KEY"),
            access_token: read("SWIFTYPE_ACCESS_TOKEN"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.api_key.is_none()
            && self.access_token.is_none()
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |value: &Option<String>| value.as_ref().map(|_| "***");
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .field("api_key", &mask(&self.api_key))
            .field("access_token", &mask(&self.access_token))
            .finish()
    }
}
