//! Outbound HTTP transport to the remote MCP service.

pub mod upstream;

pub use upstream::UpstreamClient;
