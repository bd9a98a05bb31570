//! Static routing table: JSON-RPC method → HTTP endpoint and timeout.

use std::time::Duration;

/// One row of the routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// JSON-RPC method name as sent by the client.
    pub method: &'static str,
    /// Path appended to the base URL.
    pub endpoint: &'static str,
    /// Whole-request timeout for the HTTP call.
    pub timeout: Duration,
}

/// Every method the bridge forwards. Anything else is `-32601`.
pub const ROUTES: &[Route] = &[
    Route {
        method: "initialize",
        endpoint: "/initialize",
        timeout: Duration::from_secs(30),
    },
    Route {
        method: "tools/list",
        endpoint: "/tools/list",
        timeout: Duration::from_secs(30),
    },
    // Tool execution runs server-side work, so it gets the longest budget.
    Route {
        method: "tools/call",
        endpoint: "/tools/call",
        timeout: Duration::from_secs(60),
    },
    Route {
        method: "ping",
        endpoint: "/ping",
        timeout: Duration::from_secs(10),
    },
];

/// Look up the route for a method. Matching is exact and case-sensitive.
pub fn route_for(method: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.method == method)
}
