//! HTTP client for the remote MCP service.
//!
//! One call per forwarded request. The timeout is supplied per call because
//! each method has its own budget. There is no retry: a failed call is
//! reported once and the client decides what to do.
//!
//! # Error Classification
//!
//! reqwest errors are mapped onto [`UpstreamError`]:
//! - Timeout (connect, send or body read) → `Timeout`
//! - Connection refused, DNS failure, TLS failure → `ConnectionFailed`
//! - Non-2xx status → `HttpStatus`
//! - 2xx with a body that is not JSON → `InvalidBody`
//! - Anything else → `Request`

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, UpstreamError};

/// HTTP client bound to one base URL.
///
/// The underlying reqwest client keeps its connection pool for the lifetime
/// of the process, so consecutive requests reuse the same connection.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    config: BridgeConfig,
}

impl UpstreamClient {
    /// Build a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ClientBuild` if the TLS backend cannot be
    /// initialised.
    pub fn new(config: BridgeConfig) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .tcp_nodelay(true)
            .build()
            .map_err(BridgeError::ClientBuild)?;

        Ok(Self { client, config })
    }

    /// POST `body` as JSON to `base_url + endpoint` and return the parsed
    /// response body.
    ///
    /// # Errors
    ///
    /// Any failure before a 2xx JSON body is in hand; see the module docs for
    /// the classification.
    #[tracing::instrument(skip(self, body), fields(url = tracing::field::Empty))]
    pub async fn post_json(
        &self,
        endpoint: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, UpstreamError> {
        let url = self.config.endpoint_url(endpoint);
        tracing::Span::current().record("url", url.as_str());

        debug!(timeout_secs = timeout.as_secs(), "Forwarding request to upstream");

        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .json(body);

        self.execute(request, &url, timeout).await
    }

    /// GET `base_url + endpoint` and return the parsed response body.
    ///
    /// Used by the one-shot health probe.
    #[tracing::instrument(skip(self), fields(url = tracing::field::Empty))]
    pub async fn get_json(&self, endpoint: &str, timeout: Duration) -> Result<Value, UpstreamError> {
        let url = self.config.endpoint_url(endpoint);
        tracing::Span::current().record("url", url.as_str());

        let request = self.client.get(&url).timeout(timeout);
        self.execute(request, &url, timeout).await
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        timeout: Duration,
    ) -> Result<Value, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(|e| classify_error(e, url, timeout))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Upstream returned error status");
            return Err(UpstreamError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_error(e, url, timeout))?;

        let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(error = %e, body_size = bytes.len(), "Failed to parse upstream response");
            UpstreamError::InvalidBody {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        debug!(status = %status, body_size = bytes.len(), "Received upstream response");
        Ok(body)
    }
}

/// Classify a reqwest error into an [`UpstreamError`].
fn classify_error(error: reqwest::Error, url: &str, timeout: Duration) -> UpstreamError {
    if error.is_timeout() {
        warn!(timeout_secs = timeout.as_secs(), "Upstream request timed out");
        UpstreamError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else if error.is_connect() {
        warn!(error = %error, "Failed to connect to upstream");
        UpstreamError::ConnectionFailed {
            url: url.to_string(),
            reason: root_cause(&error),
        }
    } else {
        warn!(error = %error, "Upstream request failed");
        UpstreamError::Request(error)
    }
}

/// The innermost error message, which for connect failures is the useful
/// part ("Connection refused (os error 111)").
fn root_cause(error: &(dyn std::error::Error + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
