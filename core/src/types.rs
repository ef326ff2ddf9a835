//! Response envelope returned by every successful call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status plus parsed JSON body.
///
/// `body` is `None` for 204 and any other empty payload; serialized
/// envelopes then have no `body` key at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<Value> {
        self.body
    }
}
