//! Response envelope.
//!
//! Every response carries the protocol version tag, the original request id
//! and either a `result` or an `error{code, message}`. Expected domain
//! errors surface their own code and message; everything else collapses into
//! a generic internal error that leaks no implementation detail.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::feeds::FeedError;

/// Protocol version tag carried by every response.
pub const PROTOCOL_VERSION: &str = "0.1";

/// Fixed code for requests naming no allow-listed method.
pub const CODE_INVALID_METHOD: &str = "INVALID_METHOD";

/// Fixed code for unexpected failures.
pub const CODE_INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Error body of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// A wire response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub version: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ResponseEnvelope {
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            id,
            result: None,
            error: Some(ErrorBody { code: code.into(), message: message.into() }),
        }
    }

    /// An expected domain error, surfaced verbatim.
    pub fn domain_error(id: Value, err: &FeedError) -> Self {
        Self::error(id, err.code(), err.to_string())
    }

    pub fn invalid_method(id: Value) -> Self {
        Self::error(id, CODE_INVALID_METHOD, "unknown method")
    }

    pub fn internal_error(id: Value) -> Self {
        Self::error(id, CODE_INTERNAL_ERROR, "internal error")
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_some()
    }
}
