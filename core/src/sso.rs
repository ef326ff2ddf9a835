//! Single-sign-on token and URL construction.
//!
//! Pure computation; the only outside input is the current time, read
//! through a `Clock` so tests can pin it.

use std::time::{SystemTime, UNIX_EPOCH};

use sha1::{Digest, Sha1};

use crate::params::Params;

/// Source of the current Unix timestamp in seconds.
pub trait Clock: Send + Sync {
    fn unix_timestamp(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> u64 {
        self.0
    }
}

/// Lowercase hex SHA-1 of `"{user_id}:{client_secret}:{timestamp}"`.
pub fn sso_token(user_id: &str, client_secret: &str, timestamp: u64) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("{user_id}:{client_secret}:{timestamp}").as_bytes());
    hex::encode(hasher.finalize())
}

/// `https://{sso_host}/sso?user_id=..&client_id=..&timestamp=..&token=..`
///
/// `client_id` is left out of the query when not configured.
pub fn sso_url(
    sso_host: &str,
    user_id: &str,
    client_id: Option<&str>,
    client_secret: &str,
    timestamp: u64,
) -> String {
    let params = Params::new()
        .with("user_id", user_id)
        .with_opt("client_id", client_id)
        .with("timestamp", timestamp)
        .with("token", sso_token(user_id, client_secret, timestamp));
    format!("https://{sso_host}/sso?{}", params.to_query_string())
}
