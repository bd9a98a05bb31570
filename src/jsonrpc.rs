//! JSON-RPC 2.0 envelopes produced by the bridge itself.
//!
//! Successful responses come back from the remote service and are passed
//! through untouched, so the only envelopes built locally are error responses.
//! Field order on the wire follows the struct order: `jsonrpc`, `id`, `error`
//! and `code`, `message`, `data`.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only protocol version the bridge speaks.
pub const JSONRPC_VERSION: &str = "2.0";

/// Invalid JSON was received.
pub const PARSE_ERROR: i32 = -32700;

/// The method does not exist in the routing table.
pub const METHOD_NOT_FOUND: i32 = -32601;

/// Transport or internal failure while handling the request.
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code (one of the reserved codes above)
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Additional error data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A complete JSON-RPC 2.0 error response.
///
/// `id` is kept as a raw [`Value`]: the bridge echoes whatever the client
/// sent, and uses `null` when the request could not be read at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub jsonrpc: String,
    pub id: Value,
    pub error: JsonRpcError,
}

impl ErrorResponse {
    fn new(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcError {
                code,
                message,
                data: None,
            },
        }
    }

    /// `-32700` for a line that could not be parsed. The id is always null.
    pub fn parse_error(details: impl std::fmt::Display) -> Self {
        Self::new(Value::Null, PARSE_ERROR, format!("Parse error: {details}"))
    }

    /// `-32601` for a method with no route.
    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::new(id, METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    /// `-32603` for transport failures and fatal loop errors.
    pub fn internal_error(id: Value, details: impl std::fmt::Display) -> Self {
        Self::new(id, INTERNAL_ERROR, format!("Internal error: {details}"))
    }

    /// Convert into a [`Value`] so it can share a code path with
    /// pass-through responses.
    pub fn into_value(self) -> Value {
        // Serializing plain strings, integers and a Value cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// The fields of an incoming request the bridge actually looks at.
///
/// Anything that parsed as JSON is accepted here: a missing `method` reads as
/// the empty string and a missing `id` reads as `null`, so non-object input
/// falls through to the method-not-found branch. A non-string `method` is
/// kept as its JSON text (`42`, `null`) so error messages can name it; no
/// such text matches a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestHeader<'a> {
    pub id: Value,
    pub method: Cow<'a, str>,
}

impl<'a> RequestHeader<'a> {
    pub fn from_value(request: &'a Value) -> Self {
        let method = match request.get("method") {
            None => Cow::Borrowed(""),
            Some(Value::String(name)) => Cow::Borrowed(name.as_str()),
            Some(other) => Cow::Owned(other.to_string()),
        };
        Self {
            id: request.get("id").cloned().unwrap_or(Value::Null),
            method,
        }
    }
}

/// Whether a value has the shape of a JSON-RPC 2.0 response.
///
/// Requires `"jsonrpc": "2.0"`, an `id` member, and exactly one of `result`
/// or `error`.
pub fn is_response_shaped(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    obj.get("jsonrpc").and_then(Value::as_str) == Some(JSONRPC_VERSION)
        && obj.contains_key("id")
        && (obj.contains_key("result") != obj.contains_key("error"))
}
