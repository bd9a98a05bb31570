//! Startup configuration.
//!
//! The bridge reads its configuration exactly once, at process start. The
//! values come from [`BridgeArgs`](crate::cli::BridgeArgs), which clap fills
//! from flags or the environment.

use crate::error::BridgeError;

/// Base URL used when `MCP_SERVER_URL` is unset.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:6080/mcp";

/// Environment variable holding the remote base URL.
pub const SERVER_URL_ENV: &str = "MCP_SERVER_URL";

/// Environment variable enabling debug diagnostics.
pub const DEBUG_ENV: &str = "MCP_DEBUG";

/// Validated bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Remote base URL without a trailing slash. Endpoint paths are appended
    /// verbatim.
    pub base_url: String,
}

impl BridgeConfig {
    /// Validate and normalize a base URL.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::InvalidServerUrl` if the URL does not parse or
    /// its scheme is not `http` or `https`.
    pub fn new(server_url: &str) -> Result<Self, BridgeError> {
        let trimmed = server_url.trim().trim_end_matches('/');

        let parsed =
            reqwest::Url::parse(trimmed).map_err(|e| BridgeError::InvalidServerUrl {
                url: server_url.to_string(),
                reason: e.to_string(),
            })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BridgeError::InvalidServerUrl {
                url: server_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: trimmed.to_string(),
        })
    }

    /// Full URL for an endpoint path such as `/tools/list`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}
