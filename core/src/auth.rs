//! Authentication resolution.
//!
//! Precedence is fixed and evaluated on every request:
//! username+password, then access token (only when no API key is set), then
//! API key, and otherwise `AuthorizationRequired` before any I/O happens.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::config::Credentials;
use crate::error::{ApiError, Result};
use crate::params::Params;

/// Query parameter carrying an API key.
pub const AUTH_TOKEN_PARAM: &str = "auth_token";

/// The scheme chosen for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Base64 of `username:password`.
    Basic(String),
    Bearer(String),
    /// API key sent as the `auth_token` query parameter.
    QueryToken(String),
}

impl Auth {
    pub fn resolve(credentials: &Credentials) -> Result<Auth> {
        if let (Some(username), Some(password)) = (&credentials.username, &credentials.password) {
            return Ok(Auth::Basic(BASE64.encode(format!("{username}:{password}"))));
        }
        match (&credentials.access_token, &credentials.api_key) {
            (Some(token), None) => Ok(Auth::Bearer(token.clone())),
            (_, Some(api_key)) => Ok(Auth::QueryToken(api_key.clone())),
            (None, None) => Err(ApiError::AuthorizationRequired),
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Auth::Basic(_) => "basic",
            Auth::Bearer(_) => "bearer",
            Auth::QueryToken(_) => "api_key",
        }
    }

    /// Adds the `Authorization` header or the `auth_token` parameter.
    /// A bearer token drops any caller-supplied `auth_token`.
    pub fn apply(&self, headers: &mut Vec<(String, String)>, params: &mut Params) {
        match self {
            Auth::Basic(encoded) => {
                headers.push(("Authorization".to_string(), format!("Basic {encoded}")));
            }
            Auth::Bearer(token) => {
                params.remove(AUTH_TOKEN_PARAM);
                headers.push(("Authorization".to_string(), format!("Bearer {token}")));
            }
            Auth::QueryToken(api_key) => params.set(AUTH_TOKEN_PARAM, api_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_credentials() -> Credentials {
        Credentials {
            username: Some("some_user".into()),
            password: Some("some_password".into()),
            api_key: Some("a-test-api-key".into()),
            access_token: Some("token".into()),
        }
    }

    #[test]
    fn basic_wins_over_everything() {
        let auth = Auth::resolve(&all_credentials()).unwrap();
        assert_eq!(auth, Auth::Basic("c29tZV91c2VyOnNvbWVfcGFzc3dvcmQ=".into()));
    }

    #[test]
    fn username_without_password_is_not_basic() {
        let creds = Credentials {
            password: None,
            ..all_credentials()
        };
        // api_key is set, so the access token is skipped as well.
        assert_eq!(
            Auth::resolve(&creds).unwrap(),
            Auth::QueryToken("a-test-api-key".into())
        );
    }

    #[test]
    fn access_token_used_only_without_api_key() {
        let creds = Credentials::access_token("token");
        assert_eq!(Auth::resolve(&creds).unwrap(), Auth::Bearer("token".into()));

        let creds = Credentials {
            api_key: Some("key".into()),
            ..Credentials::access_token("token")
        };
        assert_eq!(Auth::resolve(&creds).unwrap(), Auth::QueryToken("key".into()));
    }

    #[test]
    fn no_credentials_is_authorization_required() {
        let err = Auth::resolve(&Credentials::none()).unwrap_err();
        assert!(matches!(err, ApiError::AuthorizationRequired));
    }

    #[test]
    fn bearer_strips_caller_auth_token() {
        let mut headers = Vec::new();
        let mut params = Params::new().with(AUTH_TOKEN_PARAM, "caller").with("page", 1u32);
        Auth::Bearer("token".into()).apply(&mut headers, &mut params);
        assert_eq!(headers, vec![("Authorization".into(), "Bearer token".into())]);
        assert!(!params.contains(AUTH_TOKEN_PARAM));
        assert!(params.contains("page"));
    }

    #[test]
    fn query_token_overrides_caller_auth_token() {
        let mut headers = Vec::new();
        let mut params = Params::new().with(AUTH_TOKEN_PARAM, "caller");
        Auth::QueryToken("key".into()).apply(&mut headers, &mut params);
        assert!(headers.is_empty());
        assert_eq!(params.to_query_string(), "auth_token=key");
    }
}
