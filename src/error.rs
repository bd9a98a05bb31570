//! Error types for the stdio loop, the upstream client, and startup.
//!
//! `FramingError` covers reading one line of input: size limits, encoding,
//! malformed JSON, and IO. Everything except `Io` is answered with a `-32700`
//! response and the loop moves on.
//!
//! `UpstreamError` covers a single HTTP round-trip to the remote service. Its
//! `Display` output becomes the `<details>` in `"Internal error: <details>"`.
//!
//! `BridgeError` covers startup and the loop itself. These are the only
//! errors that end the process.

use std::time::Duration;

/// Errors that can occur when reading and parsing one NDJSON line.
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    /// A single line exceeds the maximum message size.
    ///
    /// Checked while reading, before the line is buffered in full.
    #[error("Message exceeds maximum size of {max_bytes} bytes")]
    MessageTooLarge {
        /// The configured maximum message size in bytes.
        max_bytes: usize,
    },

    /// The line is not valid UTF-8.
    #[error("invalid UTF-8 in input line: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The line is not valid JSON.
    #[error("{0}")]
    MalformedJson(#[from] serde_json::Error),

    /// An underlying IO error occurred while reading stdin.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a single request to the remote service.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// No response within the method's timeout.
    #[error("request to {url} timed out after {}s", timeout.as_secs())]
    Timeout {
        /// The URL that timed out
        url: String,
        /// The timeout that was applied
        timeout: Duration,
    },

    /// TCP connect (or TLS handshake) failed.
    #[error("cannot connect to {url}: {reason}")]
    ConnectionFailed {
        /// The URL that failed
        url: String,
        /// Reason for the connection failure
        reason: String,
    },

    /// The remote answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The URL that was called
        url: String,
        /// The HTTP status returned
        status: reqwest::StatusCode,
    },

    /// The body of a 2xx response was not valid JSON.
    #[error("invalid JSON in response from {url}: {reason}")]
    InvalidBody {
        /// The URL that was called
        url: String,
        /// The parse failure
        reason: String,
    },

    /// Any other failure raised by the HTTP client.
    #[error("{0}")]
    Request(#[from] reqwest::Error),
}

/// Errors that end the process.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The configured server URL is unusable.
    #[error("invalid server URL '{url}': {reason}")]
    InvalidServerUrl {
        /// The URL as configured
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Reading stdin failed.
    #[error("failed to read stdin: {0}")]
    StdinIo(#[source] std::io::Error),

    /// Writing or flushing stdout failed.
    #[error("failed to write stdout: {0}")]
    StdoutIo(#[source] std::io::Error),
}
