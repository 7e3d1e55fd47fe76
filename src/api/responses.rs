//! Response envelopes
//!
//! Every JSON response leaving the gateway is either
//! `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Successful response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}

/// Failed response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Whether a backend body already follows the envelope convention
pub fn is_envelope(body: &Value) -> bool {
    body.get("success").map_or(false, Value::is_boolean)
}

/// Wrap a successful backend body, leaving existing envelopes untouched
pub fn normalize_success(body: Option<Value>) -> Value {
    match body {
        Some(body) if is_envelope(&body) => body,
        Some(body) => json!({ "success": true, "data": body }),
        None => json!({ "success": true }),
    }
}
