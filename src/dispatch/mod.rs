//! Method dispatch: turn one parsed request into exactly one response.
//!
//! Known methods are forwarded over HTTP and the remote body comes back
//! unchanged. Unknown methods and transport failures become JSON-RPC error
//! responses carrying the request's `id`. Nothing here ends the process.

pub mod routes;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::jsonrpc::{ErrorResponse, RequestHeader, is_response_shaped};
use crate::transport::UpstreamClient;

pub use routes::{ROUTES, Route, route_for};

/// Routes requests to the remote service.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    upstream: UpstreamClient,
}

impl Dispatcher {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// Produce the response for one request.
    ///
    /// The returned value is either the remote body as received, or an error
    /// envelope built by the bridge.
    pub async fn dispatch(&self, request: &Value) -> Value {
        let header = RequestHeader::from_value(request);
        debug!(method = %header.method, id = %header.id, "Handling request");

        let Some(route) = route_for(&header.method) else {
            warn!(method = %header.method, "Unknown method");
            return ErrorResponse::method_not_found(header.id, &header.method).into_value();
        };

        if route.method == "tools/call" {
            info!(tool = tool_name(request), "Handling tools/call request");
        } else {
            info!(method = route.method, "Handling {} request", route.method);
        }

        match self
            .upstream
            .post_json(route.endpoint, request, route.timeout)
            .await
        {
            Ok(body) => {
                if !is_response_shaped(&body) {
                    warn!(
                        method = route.method,
                        "Upstream body is not a JSON-RPC response, passing through unchanged"
                    );
                }
                debug!(response = %body, "Successfully handled request");
                body
            }
            Err(e) => {
                warn!(method = route.method, error = %e, "HTTP request failed");
                ErrorResponse::internal_error(header.id, e).into_value()
            }
        }
    }
}

/// `params.name` of a tool call, for diagnostics only.
fn tool_name(request: &Value) -> &str {
    request
        .get("params")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}
