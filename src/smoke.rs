//! One-shot modes for checking a deployment by hand.
//!
//! `--test` and `--test-init` push a canned request through the normal
//! dispatcher; `--health` asks the remote service's health endpoint directly.
//! None of these read stdin.

use std::time::Duration;

use serde_json::{Value, json};

use crate::dispatch::Dispatcher;
use crate::error::UpstreamError;
use crate::transport::UpstreamClient;

/// Health endpoint exposed next to the MCP endpoints.
pub const HEALTH_ENDPOINT: &str = "/health";

/// Timeout for the health probe.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// MCP protocol revision announced by the canned `initialize` request.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Which canned request to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokeCheck {
    /// `tools/list` with empty params.
    ToolsList,
    /// `initialize` with this bridge as the client.
    Initialize,
}

impl SmokeCheck {
    /// The request this check sends.
    pub fn request(self) -> Value {
        match self {
            SmokeCheck::ToolsList => json!({
                "jsonrpc": "2.0",
                "id": "test",
                "method": "tools/list",
                "params": {}
            }),
            SmokeCheck::Initialize => json!({
                "jsonrpc": "2.0",
                "id": "1",
                "method": "initialize",
                "params": {
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }
            }),
        }
    }
}

/// Send the canned request and return whatever the dispatcher produced.
pub async fn run_smoke(dispatcher: &Dispatcher, check: SmokeCheck) -> Value {
    tracing::info!(?check, "Running one-shot smoke request");
    dispatcher.dispatch(&check.request()).await
}

/// GET the remote health endpoint.
///
/// # Errors
///
/// Any [`UpstreamError`]; a non-2xx health status counts as a failure.
pub async fn run_health(upstream: &UpstreamClient) -> Result<Value, UpstreamError> {
    upstream.get_json(HEALTH_ENDPOINT, HEALTH_TIMEOUT).await
}
